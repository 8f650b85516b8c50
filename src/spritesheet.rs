//! Spritesheet rendering - lays animation frames out side by side

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::composite::render;
use crate::document::Document;

/// Combine frame buffers into one sheet.
///
/// With `cols` of `None` all frames go in one row, left to right. Cells are
/// sized to the largest frame; smaller frames sit in the top-left of their
/// cell with transparent padding.
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use pixedit::buffer::PixelBuffer;
/// use pixedit::spritesheet::render_spritesheet;
///
/// let frame = PixelBuffer::filled(2, 2, Rgba([255, 0, 0, 255]));
/// let frames = vec![frame.clone(), frame.clone(), frame.clone(), frame];
///
/// let sheet = render_spritesheet(&frames, None);
/// assert_eq!(sheet.dimensions(), (8, 2));
///
/// let sheet = render_spritesheet(&frames, Some(2));
/// assert_eq!(sheet.dimensions(), (4, 4));
/// ```
pub fn render_spritesheet(frames: &[PixelBuffer], cols: Option<u32>) -> PixelBuffer {
    if frames.is_empty() {
        return PixelBuffer::new(1, 1);
    }

    let cell_width = frames.iter().map(PixelBuffer::width).max().unwrap_or(1);
    let cell_height = frames.iter().map(PixelBuffer::height).max().unwrap_or(1);

    let count = frames.len() as u32;
    let columns = cols.unwrap_or(count).max(1);
    let rows = count.div_ceil(columns);

    let mut sheet = PixelBuffer::new(columns * cell_width, rows * cell_height);
    for (i, frame) in frames.iter().enumerate() {
        let col = i as u32 % columns;
        let row = i as u32 / columns;
        sheet.blit(frame, (col * cell_width) as i32, (row * cell_height) as i32);
    }
    sheet
}

/// Composite every frame of `document`, in order.
///
/// Frames are independent, so they are flattened in parallel.
pub fn render_frames(document: &Document) -> Vec<PixelBuffer> {
    let (width, height) = (document.width(), document.height());
    document.frames().par_iter().map(|frame| render(frame, width, height)).collect()
}

/// Horizontal spritesheet of the whole animation: `width * frames` by
/// `height`.
pub fn document_spritesheet(document: &Document) -> PixelBuffer {
    render_spritesheet(&render_frames(document), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TRANSPARENT;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_empty_frames() {
        let sheet = render_spritesheet(&[], None);
        assert_eq!(sheet.dimensions(), (1, 1));
        assert!(sheet.is_transparent());
    }

    #[test]
    fn test_horizontal_layout() {
        let frames = vec![
            PixelBuffer::filled(2, 2, RED),
            PixelBuffer::filled(2, 2, GREEN),
            PixelBuffer::filled(2, 2, BLUE),
        ];
        let sheet = render_spritesheet(&frames, None);
        assert_eq!(sheet.dimensions(), (6, 2));
        assert_eq!(sheet.get_pixel(0, 0), Ok(RED));
        assert_eq!(sheet.get_pixel(2, 1), Ok(GREEN));
        assert_eq!(sheet.get_pixel(5, 1), Ok(BLUE));
    }

    #[test]
    fn test_uneven_grid_leaves_empty_cell() {
        let frames = vec![
            PixelBuffer::filled(2, 2, RED),
            PixelBuffer::filled(2, 2, GREEN),
            PixelBuffer::filled(2, 2, BLUE),
        ];
        let sheet = render_spritesheet(&frames, Some(2));
        assert_eq!(sheet.dimensions(), (4, 4));
        assert_eq!(sheet.get_pixel(0, 2), Ok(BLUE));
        assert_eq!(sheet.get_pixel(2, 2), Ok(TRANSPARENT));
    }

    #[test]
    fn test_smaller_frames_are_padded() {
        let frames = vec![PixelBuffer::filled(2, 2, RED), PixelBuffer::filled(4, 4, GREEN)];
        let sheet = render_spritesheet(&frames, None);
        assert_eq!(sheet.dimensions(), (8, 4));
        assert_eq!(sheet.get_pixel(1, 1), Ok(RED));
        assert_eq!(sheet.get_pixel(2, 0), Ok(TRANSPARENT));
        assert_eq!(sheet.get_pixel(7, 3), Ok(GREEN));
    }

    #[test]
    fn test_document_spritesheet_composites_frames_in_order() {
        let mut doc = Document::new(3, 2).unwrap();
        doc.active_layer_mut().buffer.fill(RED);
        doc.add_frame();
        doc.active_layer_mut().buffer.put(0, 0, GREEN);
        doc.add_frame();
        doc.add_layer(Some("top"));
        doc.active_layer_mut().buffer.put(2, 1, BLUE);
        doc.set_layer_visible(1, false).unwrap();

        let sheet = document_spritesheet(&doc);
        assert_eq!(sheet.dimensions(), (9, 2));
        assert_eq!(sheet.get_pixel(1, 1), Ok(RED));
        assert_eq!(sheet.get_pixel(3, 0), Ok(GREEN));
        assert_eq!(sheet.get_pixel(4, 0), Ok(TRANSPARENT));
        // hidden layer on the last frame is skipped
        assert_eq!(sheet.get_pixel(8, 1), Ok(TRANSPARENT));
    }
}
