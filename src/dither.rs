//! Dither patterns for pixel art effects
//!
//! A dither pattern decides, per pixel, which of two configured colors is
//! painted, simulating an intermediate shade without alpha. Density runs from
//! 1 (sparse) to 10 (dense) and maps to a repeat period of `11 - density`.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Built-in dither pattern types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherPattern {
    /// Block checkerboard, block size scaled by the period
    #[default]
    Checkerboard,
    /// Diagonal lines: `(x + y) % period == 0`
    Diagonal,
    /// Horizontal lines: `y % period == 0`
    Horizontal,
    /// Vertical lines: `x % period == 0`
    Vertical,
    /// Coin flip per pixel
    Random,
}

impl DitherPattern {
    /// Parse a pattern name string into a DitherPattern
    pub fn from_str(s: &str) -> Option<DitherPattern> {
        match s.to_lowercase().as_str() {
            "checker" | "checkerboard" => Some(DitherPattern::Checkerboard),
            "diagonal" => Some(DitherPattern::Diagonal),
            "horizontal" => Some(DitherPattern::Horizontal),
            "vertical" => Some(DitherPattern::Vertical),
            "random" | "noise" => Some(DitherPattern::Random),
            _ => None,
        }
    }
}

/// Whether the dither tool paints strokes or flood-fills regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    #[default]
    Draw,
    Fill,
}

impl DitherMode {
    pub fn from_str(s: &str) -> Option<DitherMode> {
        match s.to_lowercase().as_str() {
            "draw" => Some(DitherMode::Draw),
            "fill" => Some(DitherMode::Fill),
            _ => None,
        }
    }
}

/// Repeat period for a density, density clamped to 1..=10.
pub fn period_for_density(density: u8) -> u32 {
    11 - density.clamp(1, 10) as u32
}

/// Decide whether the first dither color applies at `(x, y)`.
///
/// Every pattern except [`DitherPattern::Random`] is a pure function of its
/// inputs; the random pattern draws from `noise`.
///
/// # Examples
///
/// ```
/// use pixedit::dither::{use_color1_at, DitherPattern, NoiseSource};
///
/// let mut noise = NoiseSource::with_seed(1);
/// // density 8 -> period 3
/// assert!(use_color1_at(0, 3, DitherPattern::Horizontal, 8, &mut noise));
/// assert!(!use_color1_at(0, 4, DitherPattern::Horizontal, 8, &mut noise));
/// ```
pub fn use_color1_at(
    x: u32,
    y: u32,
    pattern: DitherPattern,
    density: u8,
    noise: &mut NoiseSource,
) -> bool {
    let period = period_for_density(density);
    match pattern {
        DitherPattern::Checkerboard => {
            let block = (period.max(2) / 2).max(1);
            ((x / block) + (y / block)).is_multiple_of(2)
        }
        DitherPattern::Diagonal => (x + y).is_multiple_of(period),
        DitherPattern::Horizontal => y.is_multiple_of(period),
        DitherPattern::Vertical => x.is_multiple_of(period),
        DitherPattern::Random => noise.coin_flip(),
    }
}

/// The two-color dither configuration used by dither strokes and fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherSpec {
    /// First color with its opacity folded into alpha
    pub color1: Rgba<u8>,
    /// Second color with its opacity folded into alpha
    pub color2: Rgba<u8>,
    pub pattern: DitherPattern,
    pub density: u8,
}

impl DitherSpec {
    /// Resolve the color painted at `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32, noise: &mut NoiseSource) -> Rgba<u8> {
        if use_color1_at(x, y, self.pattern, self.density, noise) {
            self.color1
        } else {
            self.color2
        }
    }
}

/// Small splitmix64 generator backing the random dither pattern.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u64,
}

impl NoiseSource {
    /// A source with a fixed seed (reproducible sequences).
    pub fn with_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    /// A source seeded from the system clock.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self::with_seed(nanos)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Bernoulli(0.5).
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::from_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pattern: DitherPattern, density: u8, w: u32, h: u32) -> Vec<Vec<bool>> {
        let mut noise = NoiseSource::with_seed(0);
        (0..h)
            .map(|y| (0..w).map(|x| use_color1_at(x, y, pattern, density, &mut noise)).collect())
            .collect()
    }

    #[test]
    fn test_dither_pattern_from_str() {
        assert_eq!(DitherPattern::from_str("checker"), Some(DitherPattern::Checkerboard));
        assert_eq!(DitherPattern::from_str("Checkerboard"), Some(DitherPattern::Checkerboard));
        assert_eq!(DitherPattern::from_str("diagonal"), Some(DitherPattern::Diagonal));
        assert_eq!(DitherPattern::from_str("horizontal"), Some(DitherPattern::Horizontal));
        assert_eq!(DitherPattern::from_str("vertical"), Some(DitherPattern::Vertical));
        assert_eq!(DitherPattern::from_str("random"), Some(DitherPattern::Random));
        assert_eq!(DitherPattern::from_str("bayer"), None);
        assert_eq!(DitherMode::from_str("FILL"), Some(DitherMode::Fill));
    }

    #[test]
    fn test_period_for_density() {
        assert_eq!(period_for_density(1), 10);
        assert_eq!(period_for_density(10), 1);
        assert_eq!(period_for_density(0), 10);
        assert_eq!(period_for_density(42), 1);
    }

    #[test]
    fn test_checkerboard_dense_is_single_pixel() {
        // density 10 -> period 1 -> block 1
        let grid = sample(DitherPattern::Checkerboard, 10, 4, 2);
        assert_eq!(grid[0], vec![true, false, true, false]);
        assert_eq!(grid[1], vec![false, true, false, true]);
    }

    #[test]
    fn test_checkerboard_block_scales_with_period() {
        // density 7 -> period 4 -> 2x2 blocks
        let grid = sample(DitherPattern::Checkerboard, 7, 4, 4);
        assert_eq!(grid[0], vec![true, true, false, false]);
        assert_eq!(grid[1], vec![true, true, false, false]);
        assert_eq!(grid[2], vec![false, false, true, true]);
    }

    #[test]
    fn test_diagonal_pattern() {
        // density 8 -> period 3
        let grid = sample(DitherPattern::Diagonal, 8, 4, 2);
        assert_eq!(grid[0], vec![true, false, false, true]);
        assert_eq!(grid[1], vec![false, false, true, false]);
    }

    #[test]
    fn test_line_patterns() {
        let h = sample(DitherPattern::Horizontal, 9, 2, 3);
        assert_eq!(h, vec![vec![true, true], vec![false, false], vec![true, true]]);
        let v = sample(DitherPattern::Vertical, 9, 3, 1);
        assert_eq!(v, vec![vec![true, false, true]]);
    }

    #[test]
    fn test_random_pattern_mixes() {
        let mut noise = NoiseSource::with_seed(42);
        let hits = (0..1000)
            .filter(|_| use_color1_at(0, 0, DitherPattern::Random, 5, &mut noise))
            .count();
        assert!(hits > 400 && hits < 600, "expected roughly half, got {}", hits);
    }

    #[test]
    fn test_spec_color_at() {
        let spec = DitherSpec {
            color1: Rgba([255, 0, 0, 255]),
            color2: Rgba([0, 0, 255, 128]),
            pattern: DitherPattern::Vertical,
            density: 10,
        };
        let mut noise = NoiseSource::with_seed(0);
        // period 1: every column is color1
        assert_eq!(spec.color_at(3, 3, &mut noise), spec.color1);
    }
}
