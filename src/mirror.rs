//! Mirror reflections
//!
//! Two flavours: [`mirror_buffer`] reflects a whole buffer once, and
//! [`mirrored_points`] expands each point of a live stroke with its
//! reflections so the mirror tool paints symmetric strokes as you draw.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Axis (or axes) of reflection.
///
/// `X` reflects across the vertical centre line (`x -> width - 1 - x`), `Y`
/// across the horizontal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorAxis {
    #[default]
    None,
    X,
    Y,
    Both,
}

impl MirrorAxis {
    pub fn from_str(s: &str) -> Option<MirrorAxis> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Some(MirrorAxis::None),
            "x" | "horizontal" => Some(MirrorAxis::X),
            "y" | "vertical" => Some(MirrorAxis::Y),
            "both" | "xy" => Some(MirrorAxis::Both),
            _ => None,
        }
    }

    fn flips(self) -> (bool, bool) {
        match self {
            MirrorAxis::None => (false, false),
            MirrorAxis::X => (true, false),
            MirrorAxis::Y => (false, true),
            MirrorAxis::Both => (true, true),
        }
    }
}

/// Reflect every pixel of `buffer` across `axis` into a new buffer.
pub fn mirror_buffer(buffer: &PixelBuffer, axis: MirrorAxis) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    let (flip_x, flip_y) = axis.flips();
    let mut out = PixelBuffer::new(width, height);
    for (x, y, pixel) in buffer.as_image().enumerate_pixels() {
        let tx = if flip_x { width - 1 - x } else { x };
        let ty = if flip_y { height - 1 - y } else { y };
        out.put(tx as i32, ty as i32, *pixel);
    }
    out
}

/// The reflections of `(x, y)` for `axis`, not including the point itself.
///
/// One extra point for `X` or `Y`, three for `Both`.
pub fn reflections(x: i32, y: i32, axis: MirrorAxis, width: u32, height: u32) -> Vec<(i32, i32)> {
    let mx = width as i32 - 1 - x;
    let my = height as i32 - 1 - y;
    match axis {
        MirrorAxis::None => Vec::new(),
        MirrorAxis::X => vec![(mx, y)],
        MirrorAxis::Y => vec![(x, my)],
        MirrorAxis::Both => vec![(mx, y), (x, my), (mx, my)],
    }
}

/// Each point followed by its reflections.
pub fn mirrored_points(
    points: &[(i32, i32)],
    axis: MirrorAxis,
    width: u32,
    height: u32,
) -> Vec<(i32, i32)> {
    let mut out = Vec::with_capacity(points.len() * 4);
    for &(x, y) in points {
        out.push((x, y));
        out.extend(reflections(x, y, axis, width, height));
    }
    out
}
