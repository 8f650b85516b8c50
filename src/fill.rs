//! Scanline flood fill
//!
//! The region is collected first against the untouched buffer, then painted,
//! so a fill color that happens to match the seed never re-enters the search.
//! Traversal uses an explicit stack and a visited bitset sized to the buffer:
//! every 4-connected matching pixel is visited exactly once and recursion
//! depth is constant.

use image::Rgba;

use crate::buffer::PixelBuffer;
use crate::dither::{DitherSpec, NoiseSource};

/// Alpha difference below which the dither fill treats two pixels as equal.
pub const DITHER_ALPHA_TOLERANCE: i16 = 10;

/// Collect the 4-connected region around `(x, y)` whose pixels satisfy
/// `matches`. Returns an empty region when the seed is outside the buffer or
/// does not match itself.
pub fn fill_region<F>(buffer: &PixelBuffer, x: u32, y: u32, matches: F) -> Vec<(u32, u32)>
where
    F: Fn(Rgba<u8>) -> bool,
{
    let (width, height) = buffer.dimensions();
    let mut region = Vec::new();
    if x >= width || y >= height {
        return region;
    }

    let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;
    let mut visited = vec![false; width as usize * height as usize];
    let is_candidate = |visited: &[bool], x: u32, y: u32| {
        !visited[index(x, y)] && buffer.pixel_at(x as i32, y as i32).is_some_and(&matches)
    };

    let mut stack = vec![(x, y)];
    while let Some((sx, sy)) = stack.pop() {
        if !is_candidate(&visited, sx, sy) {
            continue;
        }

        // Extend the span left and right on this row
        let mut left = sx;
        while left > 0 && is_candidate(&visited, left - 1, sy) {
            left -= 1;
        }
        let mut right = sx;
        while right + 1 < width && is_candidate(&visited, right + 1, sy) {
            right += 1;
        }

        for px in left..=right {
            visited[index(px, sy)] = true;
            region.push((px, sy));
        }

        // Seed one entry per matching run in the rows above and below
        let neighbours = [sy.checked_sub(1), Some(sy + 1).filter(|&ny| ny < height)];
        for ny in neighbours.into_iter().flatten() {
            let mut in_run = false;
            for px in left..=right {
                if is_candidate(&visited, px, ny) {
                    if !in_run {
                        stack.push((px, ny));
                        in_run = true;
                    }
                } else {
                    in_run = false;
                }
            }
        }
    }

    region
}

/// Fill the region of exactly `seed`-colored pixels with `color`.
///
/// Returns the number of pixels written. Filling with the seed's own color is
/// a no-op.
pub fn flood_fill(buffer: &mut PixelBuffer, x: u32, y: u32, color: Rgba<u8>) -> usize {
    let Ok(seed) = buffer.get_pixel(x, y) else {
        return 0;
    };
    if seed == color {
        return 0;
    }

    let region = fill_region(buffer, x, y, |p| p == seed);
    for &(px, py) in &region {
        buffer.put(px as i32, py as i32, color);
    }
    region.len()
}

/// Fill a region with a two-color dither pattern.
///
/// Matching tolerates alpha differences below [`DITHER_ALPHA_TOLERANCE`] so
/// antialiased edges are included. A fully transparent seed is a no-op.
pub fn dither_fill(
    buffer: &mut PixelBuffer,
    x: u32,
    y: u32,
    spec: &DitherSpec,
    noise: &mut NoiseSource,
) -> usize {
    let Ok(seed) = buffer.get_pixel(x, y) else {
        return 0;
    };
    if seed[3] == 0 {
        return 0;
    }

    let region = fill_region(buffer, x, y, |p| {
        p[0] == seed[0]
            && p[1] == seed[1]
            && p[2] == seed[2]
            && (p[3] as i16 - seed[3] as i16).abs() < DITHER_ALPHA_TOLERANCE
    });
    for &(px, py) in &region {
        buffer.put(px as i32, py as i32, spec.color_at(px, py, noise));
    }
    region.len()
}
