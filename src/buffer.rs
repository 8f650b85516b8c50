//! Owned RGBA8 pixel buffers
//!
//! A [`PixelBuffer`] is the unit of mutation for every drawing operation. It
//! wraps an `image::RgbaImage` (row-major RGBA8, top-left origin) and adds the
//! two access styles the editor needs:
//!
//! - bounds-checked accessors (`get_pixel`/`set_pixel`) that report
//!   [`BufferError::OutOfBounds`], and
//! - clipping writers (`put`, `blend`, `erase`) taking signed coordinates,
//!   used by brush stamps that routinely straddle the edges.
//!
//! Buffers are never resized in place; [`PixelBuffer::resize`] returns a new one.

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::color::TRANSPARENT;
use crate::composite::source_over;

/// Errors raised by direct buffer access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Coordinate outside `[0, width) x [0, height)`
    #[error("coordinates ({x}, {y}) out of bounds for {width}x{height} buffer")]
    OutOfBounds { x: i64, y: i64, width: u32, height: u32 },
    /// Raw byte length does not match `width * height * 4`
    #[error("expected {expected} bytes for {width}x{height} buffer, got {actual}")]
    LengthMismatch { width: u32, height: u32, expected: usize, actual: usize },
}

/// A width x height grid of RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a buffer with every pixel fully transparent `(0, 0, 0, 0)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, TRANSPARENT) }
    }

    /// Create a buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, color) }
    }

    /// Wrap an existing image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build a buffer from raw row-major RGBA bytes.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * 4;
        let actual = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .map(Self::from_image)
            .ok_or(BufferError::LengthMismatch { width, height, expected, actual })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA bytes, `width * height * 4` long.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Whether a signed coordinate lies inside the buffer.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Read a pixel.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] outside the buffer.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgba<u8>, BufferError> {
        self.check_bounds(x, y)?;
        Ok(*self.image.get_pixel(x, y))
    }

    /// Overwrite a pixel (no blending).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) -> Result<(), BufferError> {
        self.check_bounds(x, y)?;
        self.image.put_pixel(x, y, color);
        Ok(())
    }

    /// Read a pixel at a signed coordinate, `None` when outside.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.contains(x, y) {
            Some(*self.image.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Overwrite a pixel, silently ignoring coordinates outside the buffer.
    pub fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.contains(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Composite `color` over the existing pixel (source-over), clipped.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if color[3] == 0 || !self.contains(x, y) {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        *dst = source_over(color, *dst);
    }

    /// Drive the pixel's alpha toward zero by `strength` (0.0-1.0), clipped.
    ///
    /// Pixels that end up with zero alpha are normalized to `(0, 0, 0, 0)`.
    pub fn erase(&mut self, x: i32, y: i32, strength: f32) {
        if strength <= 0.0 || !self.contains(x, y) {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let remaining = (dst[3] as f32 * (1.0 - strength.min(1.0))).round() as u8;
        if remaining == 0 {
            *dst = TRANSPARENT;
        } else {
            dst[3] = remaining;
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }

    /// True when every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.image.pixels().all(|p| p[3] == 0)
    }

    /// Copy this buffer into a new one of the given size.
    ///
    /// The overlapping top-left `min(w) x min(h)` rectangle is copied pixel for
    /// pixel; any newly added area is transparent. Content is never scaled.
    pub fn resize(&self, new_width: u32, new_height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(new_width, new_height);
        let copy_w = self.width().min(new_width);
        let copy_h = self.height().min(new_height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                out.image.put_pixel(x, y, *self.image.get_pixel(x, y));
            }
        }
        out
    }

    /// Translate the content by `(dx, dy)` without wraparound.
    ///
    /// Pixels moved past an edge are lost; the exposed area is transparent.
    pub fn shifted(&self, dx: i32, dy: i32) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width(), self.height());
        out.blit(self, dx, dy);
        out
    }

    /// Copy every pixel of `src` into this buffer at offset `(dx, dy)`.
    ///
    /// Raw copy (no blending); parts of `src` landing outside are dropped.
    pub fn blit(&mut self, src: &PixelBuffer, dx: i32, dy: i32) {
        for (x, y, pixel) in src.image.enumerate_pixels() {
            self.put(x as i32 + dx, y as i32 + dy, *pixel);
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), BufferError> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(BufferError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width(),
                height: self.height(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    /// A buffer where every pixel encodes its own coordinate.
    fn patterned(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, Rgba([x as u8, y as u8, 7, 255])).unwrap();
            }
        }
        buf
    }

    #[test]
    fn test_new_is_transparent() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.as_raw().len(), 3 * 2 * 4);
        assert!(buf.is_transparent());
        assert_eq!(buf.get_pixel(2, 1), Ok(TRANSPARENT));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut buf = PixelBuffer::new(2, 2);
        assert!(buf.set_pixel(1, 1, RED).is_ok());
        assert_eq!(buf.get_pixel(1, 1), Ok(RED));

        match buf.get_pixel(2, 0) {
            Err(BufferError::OutOfBounds { x, y, width, height }) => {
                assert_eq!((x, y, width, height), (2, 0, 2, 2));
            }
            other => panic!("Expected OutOfBounds, got: {:?}", other),
        }
        assert!(buf.set_pixel(0, 2, RED).is_err());
    }

    #[test]
    fn test_clipped_writes_ignore_outside() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.put(-1, 0, RED);
        buf.put(0, 5, RED);
        buf.blend(2, 2, RED);
        buf.erase(-3, -3, 1.0);
        assert!(buf.is_transparent());
    }

    #[test]
    fn test_from_raw_length_checked() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err, BufferError::LengthMismatch { width: 2, height: 2, expected: 16, actual: 15 });
    }

    #[test]
    fn test_resize_preserves_overlap_when_growing() {
        let original = patterned(3, 2);
        let grown = original.resize(5, 4);
        assert_eq!(grown.dimensions(), (5, 4));
        for y in 0..4 {
            for x in 0..5 {
                let px = grown.get_pixel(x, y).unwrap();
                if x < 3 && y < 2 {
                    assert_eq!(px, original.get_pixel(x, y).unwrap());
                } else {
                    assert_eq!(px, TRANSPARENT, "new area at ({}, {}) must be transparent", x, y);
                }
            }
        }
    }

    #[test]
    fn test_resize_preserves_overlap_when_shrinking() {
        let original = patterned(4, 4);
        let shrunk = original.resize(2, 3);
        assert_eq!(shrunk.dimensions(), (2, 3));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(shrunk.get_pixel(x, y), original.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_resize_mixed_axes() {
        let original = patterned(4, 2);
        let resized = original.resize(2, 5);
        for y in 0..5 {
            for x in 0..2 {
                let expected = if y < 2 { original.get_pixel(x, y).unwrap() } else { TRANSPARENT };
                assert_eq!(resized.get_pixel(x, y).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = PixelBuffer::new(2, 2);
        let b = a.clone();
        a.set_pixel(0, 0, RED).unwrap();
        assert_eq!(b.get_pixel(0, 0), Ok(TRANSPARENT));
    }

    #[test]
    fn test_shifted_drops_and_exposes() {
        let original = patterned(3, 3);
        let moved = original.shifted(1, -1);
        // (0,1) moved to (1,0)
        assert_eq!(moved.get_pixel(1, 0), original.get_pixel(0, 1));
        // Left column and bottom row are exposed
        assert_eq!(moved.get_pixel(0, 0), Ok(TRANSPARENT));
        assert_eq!(moved.get_pixel(2, 2), Ok(TRANSPARENT));
    }

    #[test]
    fn test_blend_over_transparent_keeps_color() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.blend(0, 0, Rgba([10, 20, 30, 128]));
        assert_eq!(buf.get_pixel(0, 0), Ok(Rgba([10, 20, 30, 128])));
    }

    #[test]
    fn test_erase_reduces_alpha() {
        let mut buf = PixelBuffer::filled(1, 1, RED);
        buf.erase(0, 0, 0.5);
        assert_eq!(buf.get_pixel(0, 0).unwrap()[3], 128);
        buf.erase(0, 0, 1.0);
        assert_eq!(buf.get_pixel(0, 0), Ok(TRANSPARENT));
    }
}
