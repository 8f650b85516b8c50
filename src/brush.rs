//! Brush stamping
//!
//! [`plot`] is the primitive every drawing tool ends in: it stamps one brush
//! footprint centred on a point. Lines and shapes rasterize to points (see
//! [`crate::shapes`]) and stamp each of them. Stamps clip silently at the
//! buffer edges.

use image::Rgba;

use crate::buffer::PixelBuffer;
use crate::dither::{DitherSpec, NoiseSource};
use crate::shapes::rasterize_line;

/// Footprint of a stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushShape {
    /// `size x size` square, top-left at `center - size / 2`
    Square,
    /// Disc of radius `size / 2`
    Circle,
}

/// What a stamp does to the pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ink {
    /// Composite a color (source-over)
    Color(Rgba<u8>),
    /// Subtract alpha from the destination
    Erase,
    /// Composite one of two colors chosen per pixel by a dither pattern
    Dither(DitherSpec),
}

/// A fully resolved brush: footprint, softness and ink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub size: u32,
    pub shape: BrushShape,
    /// Extra radius over which alpha falls off linearly to zero
    pub blur: u32,
    pub ink: Ink,
}

impl Brush {
    /// Single hard pixel.
    pub fn pencil(color: Rgba<u8>) -> Self {
        Self { size: 1, shape: BrushShape::Square, blur: 0, ink: Ink::Color(color) }
    }

    /// Round brush of the given size and blur.
    pub fn round(color: Rgba<u8>, size: u32, blur: u32) -> Self {
        Self { size: size.max(1), shape: BrushShape::Circle, blur, ink: Ink::Color(color) }
    }

    /// Round eraser of the given size and blur.
    pub fn eraser(size: u32, blur: u32) -> Self {
        Self { size: size.max(1), shape: BrushShape::Circle, blur, ink: Ink::Erase }
    }

    /// Square dither stamp.
    pub fn dither(spec: DitherSpec, size: u32) -> Self {
        Self { size: size.max(1), shape: BrushShape::Square, blur: 0, ink: Ink::Dither(spec) }
    }

    fn radius(&self) -> i32 {
        (self.size / 2) as i32
    }
}

/// Stamp `brush` centred on `(x, y)`.
pub fn plot(buffer: &mut PixelBuffer, x: i32, y: i32, brush: &Brush, noise: &mut NoiseSource) {
    match brush.shape {
        BrushShape::Square => {
            let size = brush.size.max(1) as i32;
            let start_x = x - size / 2;
            let start_y = y - size / 2;
            for py in start_y..start_y + size {
                for px in start_x..start_x + size {
                    apply_ink(buffer, px, py, brush.ink, 1.0, noise);
                }
            }
        }
        BrushShape::Circle => {
            let radius = brush.radius();
            let outer = radius + brush.blur as i32;
            for dy in -outer..=outer {
                for dx in -outer..=outer {
                    let strength = coverage(dx, dy, radius, brush.blur);
                    if strength > 0.0 {
                        apply_ink(buffer, x + dx, y + dy, brush.ink, strength, noise);
                    }
                }
            }
        }
    }
}

/// Stamp `brush` at every point in order.
pub fn plot_points(
    buffer: &mut PixelBuffer,
    points: &[(i32, i32)],
    brush: &Brush,
    noise: &mut NoiseSource,
) {
    for &(x, y) in points {
        plot(buffer, x, y, brush, noise);
    }
}

/// Stamp `brush` along a Bresenham line, both endpoints included.
pub fn draw_line(
    buffer: &mut PixelBuffer,
    from: (i32, i32),
    to: (i32, i32),
    brush: &Brush,
    noise: &mut NoiseSource,
) {
    plot_points(buffer, &rasterize_line(from, to), brush, noise);
}

/// Stamp `brush` along a line whose start point is already stamped.
///
/// Used for each pointer move of a freehand stroke so the joint between two
/// segments is blended once.
pub fn continue_line(
    buffer: &mut PixelBuffer,
    from: (i32, i32),
    to: (i32, i32),
    brush: &Brush,
    noise: &mut NoiseSource,
) {
    let line = rasterize_line(from, to);
    plot_points(buffer, line.get(1..).unwrap_or_default(), brush, noise);
}

/// Fraction of ink applied at offset `(dx, dy)` from the stamp centre.
///
/// Hard discs cover `dx² + dy² <= r²` fully. With blur, alpha falls off
/// linearly from the centre to zero at `r + blur`.
fn coverage(dx: i32, dy: i32, radius: i32, blur: u32) -> f32 {
    let dist_sq = dx * dx + dy * dy;
    if blur == 0 {
        return if dist_sq <= radius * radius { 1.0 } else { 0.0 };
    }
    let outer = (radius + blur as i32) as f32;
    let dist = (dist_sq as f32).sqrt();
    (1.0 - dist / outer).max(0.0)
}

fn apply_ink(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    ink: Ink,
    strength: f32,
    noise: &mut NoiseSource,
) {
    if !buffer.contains(x, y) {
        return;
    }
    match ink {
        Ink::Color(color) => buffer.blend(x, y, scale_alpha(color, strength)),
        Ink::Erase => buffer.erase(x, y, strength),
        Ink::Dither(spec) => {
            let color = spec.color_at(x as u32, y as u32, noise);
            buffer.blend(x, y, scale_alpha(color, strength));
        }
    }
}

fn scale_alpha(color: Rgba<u8>, strength: f32) -> Rgba<u8> {
    if strength >= 1.0 {
        return color;
    }
    Rgba([color[0], color[1], color[2], (color[3] as f32 * strength).round() as u8])
}
