//! Shape rasterization primitives for pixel-perfect rendering.
//!
//! These functions convert geometric shapes into integer pixel coordinates.
//! They are pure: the brush layer ([`crate::brush`]) decides what each point
//! stamps. Points come back in plotting order with duplicates removed, so a
//! semi-transparent brush never double-blends a shared corner.

use std::collections::HashSet;

/// Rasterize a line using Bresenham's line algorithm.
///
/// Integer-only and valid in all 8 octants; for fixed endpoints the same
/// points are produced every time, both endpoints included.
///
/// # Examples
///
/// ```
/// use pixedit::shapes::rasterize_line;
///
/// let pixels = rasterize_line((0, 0), (3, 1));
/// assert_eq!(pixels, vec![(0, 0), (1, 0), (2, 1), (3, 1)]);
/// ```
pub fn rasterize_line(p0: (i32, i32), p1: (i32, i32)) -> Vec<(i32, i32)> {
    let mut pixels = Vec::new();

    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        pixels.push((x0, y0));

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    pixels
}

/// Rasterize the outline of the axis-aligned rectangle spanned by two corners.
///
/// Built from four Bresenham lines; the interior is left untouched.
///
/// # Examples
///
/// ```
/// use pixedit::shapes::rasterize_rect_outline;
///
/// let pixels = rasterize_rect_outline((0, 0), (3, 3));
/// assert_eq!(pixels.len(), 12);
/// assert!(!pixels.contains(&(1, 1)));
/// ```
pub fn rasterize_rect_outline(p0: (i32, i32), p1: (i32, i32)) -> Vec<(i32, i32)> {
    let (x0, y0) = p0;
    let (x1, y1) = p1;
    let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];

    let mut pixels = Vec::new();
    for i in 0..4 {
        pixels.extend(rasterize_line(corners[i], corners[(i + 1) % 4]));
    }
    dedup_points(pixels)
}

/// Rasterize a circle outline with the midpoint algorithm.
///
/// `center` is the drag start; the radius is the Euclidean distance to
/// `edge`, rounded down. Each computed octant point is reflected 8 ways.
///
/// # Examples
///
/// ```
/// use pixedit::shapes::rasterize_circle;
///
/// let pixels = rasterize_circle((5, 5), (7, 5));
/// assert!(pixels.contains(&(7, 5)));
/// assert!(pixels.contains(&(5, 3)));
/// assert!(!pixels.contains(&(5, 5)));
/// ```
pub fn rasterize_circle(center: (i32, i32), edge: (i32, i32)) -> Vec<(i32, i32)> {
    let radius = circle_radius(center, edge);
    rasterize_circle_radius(center, radius)
}

/// Radius for a circle dragged from `center` to `edge`.
pub fn circle_radius(center: (i32, i32), edge: (i32, i32)) -> i32 {
    let dx = (edge.0 - center.0) as f64;
    let dy = (edge.1 - center.1) as f64;
    (dx * dx + dy * dy).sqrt().floor() as i32
}

/// Rasterize a circle outline of a known radius around `center`.
pub fn rasterize_circle_radius(center: (i32, i32), radius: i32) -> Vec<(i32, i32)> {
    let (cx, cy) = center;
    if radius <= 0 {
        return vec![center];
    }

    let mut pixels = Vec::new();
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        pixels.extend([
            (cx + x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx + y, cy - x),
            (cx + x, cy - y),
        ]);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    dedup_points(pixels)
}

/// Remove repeated points, keeping the first occurrence of each.
fn dedup_points(points: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    let mut seen = HashSet::with_capacity(points.len());
    points.into_iter().filter(|p| seen.insert(*p)).collect()
}
