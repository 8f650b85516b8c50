//! Onion skinning for animation preview.
//!
//! Shows the current frame with its neighbours as faint tinted ghosts so
//! motion can be judged while drawing.

use image::Rgba;

use crate::buffer::PixelBuffer;
use crate::composite::composite_over;
use crate::document::Document;
use crate::spritesheet::render_frames;

/// Configuration for onion skin rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct OnionConfig {
    /// Number of frames before/after to show
    pub count: u32,
    /// Base opacity for ghost frames (0.0-1.0)
    pub opacity: f32,
    /// Tint for previous frames
    pub prev_color: Rgba<u8>,
    /// Tint for next frames
    pub next_color: Rgba<u8>,
    /// Fade opacity with distance from the current frame
    pub fade: bool,
}

impl Default for OnionConfig {
    fn default() -> Self {
        Self {
            count: 1,
            opacity: 0.3,
            prev_color: Rgba([0, 0, 255, 255]),
            next_color: Rgba([0, 255, 0, 255]),
            fade: false,
        }
    }
}

/// Ghost opacity at `distance` frames away.
///
/// With fade: 100% of base at distance 1, 67% at 2, 33% at 3, then nothing.
fn calculate_opacity(base_opacity: f32, distance: u32, fade: bool) -> f32 {
    if !fade || distance == 0 {
        return base_opacity;
    }
    let fade_factor = 1.0 - ((distance - 1) as f32 / 3.0);
    base_opacity * fade_factor.max(0.0)
}

/// Multiply colors by `tint` and scale alpha by `opacity`.
fn apply_tint(buffer: &PixelBuffer, tint: Rgba<u8>, opacity: f32) -> PixelBuffer {
    let opacity = opacity.clamp(0.0, 1.0);
    let (width, height) = buffer.dimensions();
    let mut out = PixelBuffer::new(width, height);
    for (x, y, pixel) in buffer.as_image().enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        let mul = |c: u8, t: u8| ((c as u16 * t as u16) / 255) as u8;
        out.put(
            x as i32,
            y as i32,
            Rgba([
                mul(pixel[0], tint[0]),
                mul(pixel[1], tint[1]),
                mul(pixel[2], tint[2]),
                (pixel[3] as f32 * opacity) as u8,
            ]),
        );
    }
    out
}

/// Render frame `current` over tinted ghosts of its neighbours.
///
/// Ghosts are drawn farthest first; the current frame goes on top untinted.
pub fn render_onion_skin(frames: &[PixelBuffer], current: usize, config: &OnionConfig) -> PixelBuffer {
    let Some(last) = frames.len().checked_sub(1) else {
        return PixelBuffer::new(1, 1);
    };
    let current = current.min(last);
    let base = &frames[current];
    let mut result = PixelBuffer::new(base.width(), base.height());

    for distance in (1..=config.count as usize).rev() {
        let opacity = calculate_opacity(config.opacity, distance as u32, config.fade);
        if let Some(prev) = current.checked_sub(distance) {
            composite_over(&mut result, &apply_tint(&frames[prev], config.prev_color, opacity));
        }
        if let Some(next) = frames.get(current + distance) {
            composite_over(&mut result, &apply_tint(next, config.next_color, opacity));
        }
    }

    composite_over(&mut result, base);
    result
}

/// Onion-skin view of `document` around frame `current`.
pub fn document_onion_skin(document: &Document, current: usize, config: &OnionConfig) -> PixelBuffer {
    render_onion_skin(&render_frames(document), current, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_calculate_opacity() {
        assert_eq!(calculate_opacity(0.3, 3, false), 0.3);
        assert!((calculate_opacity(0.3, 1, true) - 0.3).abs() < 0.001);
        assert!((calculate_opacity(0.3, 2, true) - 0.2).abs() < 0.001);
        assert_eq!(calculate_opacity(0.3, 5, true), 0.0);
    }

    #[test]
    fn test_apply_tint() {
        let buf = PixelBuffer::filled(2, 2, WHITE);
        let tinted = apply_tint(&buf, RED, 0.5);
        assert_eq!(tinted.get_pixel(0, 0), Ok(Rgba([255, 0, 0, 127])));
    }

    #[test]
    fn test_empty_frames() {
        let result = render_onion_skin(&[], 0, &OnionConfig::default());
        assert_eq!(result.dimensions(), (1, 1));
    }

    #[test]
    fn test_current_frame_on_top() {
        let frames = vec![PixelBuffer::filled(2, 2, RED), PixelBuffer::filled(2, 2, GREEN)];
        let result = render_onion_skin(&frames, 1, &OnionConfig::default());
        assert_eq!(result.get_pixel(0, 0), Ok(GREEN));
    }

    #[test]
    fn test_ghosts_fill_empty_pixels() {
        let mut current = PixelBuffer::new(2, 1);
        current.put(0, 0, GREEN);
        let frames = vec![PixelBuffer::filled(2, 1, WHITE), current];
        let config = OnionConfig { opacity: 0.5, ..OnionConfig::default() };

        let result = render_onion_skin(&frames, 1, &config);
        assert_eq!(result.get_pixel(0, 0), Ok(GREEN));
        // previous frame tinted blue at half alpha
        assert_eq!(result.get_pixel(1, 0), Ok(Rgba([0, 0, 255, 127])));
    }

    #[test]
    fn test_document_onion_skin_clamps_index() {
        let mut doc = Document::new(2, 2).unwrap();
        doc.active_layer_mut().buffer.fill(RED);
        let result = document_onion_skin(&doc, 7, &OnionConfig::default());
        assert_eq!(result.get_pixel(1, 1), Ok(RED));
    }
}
