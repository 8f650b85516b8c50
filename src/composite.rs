//! Layer compositing
//!
//! Flattens the visible layers of a frame into one display buffer using
//! porter-duff "source over". Buffers store straight (non-premultiplied)
//! alpha; the blend is computed in premultiplied space:
//!
//! ```text
//! out_a = src_a + dst_a * (1 - src_a)
//! out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a
//! ```

use image::Rgba;

use crate::buffer::PixelBuffer;
use crate::color::TRANSPARENT;
use crate::document::{Frame, Layer};

/// Composite `src` over `dst`.
pub fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }

    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * src_a + df * dst_a * (1.0 - src_a)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Draw `src` over `dst` pixel by pixel. Both buffers must share dimensions;
/// extra pixels of the larger one are ignored.
pub fn composite_over(dst: &mut PixelBuffer, src: &PixelBuffer) {
    let width = dst.width().min(src.width());
    let height = dst.height().min(src.height());
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if let Some(pixel) = src.pixel_at(x, y) {
                dst.blend(x, y, pixel);
            }
        }
    }
}

/// Flatten a layer stack bottom-to-top, skipping invisible layers.
pub fn render_layers(layers: &[Layer], width: u32, height: u32) -> PixelBuffer {
    let mut out = PixelBuffer::new(width, height);
    for layer in layers.iter().filter(|l| l.visible) {
        composite_over(&mut out, &layer.buffer);
    }
    out
}

/// Flatten a frame into its displayable composite.
pub fn render(frame: &Frame, width: u32, height: u32) -> PixelBuffer {
    render_layers(&frame.layers, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_source_over_opaque_and_transparent() {
        assert_eq!(source_over(RED, BLUE), RED);
        assert_eq!(source_over(TRANSPARENT, BLUE), BLUE);
        assert_eq!(source_over(Rgba([9, 9, 9, 77]), TRANSPARENT), Rgba([9, 9, 9, 77]));
    }

    #[test]
    fn test_source_over_half_alpha() {
        let out = source_over(Rgba([255, 0, 0, 128]), BLUE);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 128);
        assert_eq!(out[2], 127);
    }

    #[test]
    fn test_render_empty_frame_is_transparent() {
        let doc = Document::new(3, 3).unwrap();
        let out = render(doc.current_frame(), 3, 3);
        assert!(out.is_transparent());
    }

    #[test]
    fn test_render_top_layer_wins() {
        let mut doc = Document::new(2, 1).unwrap();
        doc.active_layer_mut().buffer.fill(RED);
        doc.add_layer(None);
        doc.active_layer_mut().buffer.set_pixel(0, 0, BLUE).unwrap();

        let out = render(doc.current_frame(), 2, 1);
        assert_eq!(out.get_pixel(0, 0), Ok(BLUE));
        assert_eq!(out.get_pixel(1, 0), Ok(RED));
    }

    #[test]
    fn test_render_respects_visibility() {
        let mut doc = Document::new(2, 2).unwrap();
        doc.active_layer_mut().buffer.fill(RED);
        let shown = render(doc.current_frame(), 2, 2);
        assert!(!shown.is_transparent());

        doc.set_layer_visible(0, false).unwrap();
        let hidden = render(doc.current_frame(), 2, 2);
        assert!(hidden.is_transparent(), "hidden layer must not contribute");

        doc.set_layer_visible(0, true).unwrap();
        assert_eq!(render(doc.current_frame(), 2, 2), shown);
    }
}
