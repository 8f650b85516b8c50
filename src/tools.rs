//! Tool state machine
//!
//! A [`ToolSession`] turns one pointer gesture (start, moves, end) into pixel
//! mutations on the active layer's buffer. The session is `Idle` until a start
//! lands inside the buffer, then `Dragging` until the end event (or
//! immediately back to `Idle` for instantaneous tools).
//!
//! | Tool | start | move | end |
//! |---|---|---|---|
//! | pencil / brush / eraser / dither (draw) | plot | line from previous point | - |
//! | bucket / dither (fill) | flood fill, done | - | - |
//! | eyedropper | sample composite, done | - | - |
//! | stroke / rect / circle | record origin | preview shape | commit shape |
//! | mirror | plot + reflections | line + reflections | mirrored line origin to end |
//! | move | record origin | preview shifted layer | shift layer |
//!
//! Freehand strokes are drawn into a working copy that is written back to the
//! layer on every event. Shape and move previews live in a separate buffer so
//! the layer stays untouched until the gesture ends.

use image::Rgba;
use log::debug;

use crate::brush::{continue_line, plot_points, Brush};
use crate::buffer::PixelBuffer;
use crate::color::with_opacity;
use crate::dither::{DitherMode, DitherPattern, DitherSpec, NoiseSource};
use crate::fill::{dither_fill, flood_fill};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::mirror::{mirrored_points, MirrorAxis};
use crate::shapes::{rasterize_circle, rasterize_line, rasterize_rect_outline};

/// The closed set of editing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Brush,
    Eraser,
    Bucket,
    Dither(DitherMode),
    Stroke,
    Rect,
    Circle,
    Mirror,
    Move,
    Eyedropper,
}

impl Tool {
    /// Parse a tool name. `dither` takes the given mode.
    pub fn from_str(s: &str, dither_mode: DitherMode) -> Option<Tool> {
        match s.to_lowercase().as_str() {
            "pencil" => Some(Tool::Pencil),
            "brush" => Some(Tool::Brush),
            "eraser" => Some(Tool::Eraser),
            "bucket" | "fill" => Some(Tool::Bucket),
            "dither" => Some(Tool::Dither(dither_mode)),
            "stroke" | "line" => Some(Tool::Stroke),
            "rect" | "rectangle" => Some(Tool::Rect),
            "circle" => Some(Tool::Circle),
            "mirror" => Some(Tool::Mirror),
            "move" => Some(Tool::Move),
            "eyedropper" | "picker" => Some(Tool::Eyedropper),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Bucket => "bucket",
            Tool::Dither(_) => "dither",
            Tool::Stroke => "stroke",
            Tool::Rect => "rect",
            Tool::Circle => "circle",
            Tool::Mirror => "mirror",
            Tool::Move => "move",
            Tool::Eyedropper => "eyedropper",
        }
    }

    /// Tools that complete on the start event.
    pub fn is_instant(&self) -> bool {
        matches!(self, Tool::Bucket | Tool::Dither(DitherMode::Fill) | Tool::Eyedropper)
    }
}

/// Runtime tool configuration written by a settings surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    /// Brush diameter, at least 1
    pub brush_size: u32,
    /// Soft edge width for brush and eraser
    pub blur: u32,
    /// Primary color; its alpha is ignored in favour of `opacity`
    pub color: Rgba<u8>,
    pub opacity: f32,
    pub dither_color1: Rgba<u8>,
    pub dither_opacity1: f32,
    pub dither_color2: Rgba<u8>,
    pub dither_opacity2: f32,
    /// 1 (sparse) to 10 (dense)
    pub dither_density: u8,
    pub dither_pattern: DitherPattern,
    pub mirror_axis: MirrorAxis,
    pub max_history: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            brush_size: 1,
            blur: 0,
            color: Rgba([0, 0, 0, 255]),
            opacity: 1.0,
            dither_color1: Rgba([0, 0, 0, 255]),
            dither_opacity1: 1.0,
            dither_color2: Rgba([255, 255, 255, 255]),
            dither_opacity2: 1.0,
            dither_density: 5,
            dither_pattern: DitherPattern::Checkerboard,
            mirror_axis: MirrorAxis::None,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl ToolSettings {
    /// Primary color with opacity folded into alpha.
    pub fn paint_color(&self) -> Rgba<u8> {
        with_opacity(self.color, self.opacity)
    }

    pub fn dither_spec(&self) -> DitherSpec {
        DitherSpec {
            color1: with_opacity(self.dither_color1, self.dither_opacity1),
            color2: with_opacity(self.dither_color2, self.dither_opacity2),
            pattern: self.dither_pattern,
            density: self.dither_density.clamp(1, 10),
        }
    }

    /// The brush a stamping tool paints with.
    pub fn brush_for(&self, tool: Tool) -> Brush {
        let size = self.brush_size.max(1);
        match tool {
            Tool::Pencil => Brush::pencil(self.paint_color()),
            Tool::Eraser => Brush::eraser(size, self.blur),
            Tool::Dither(_) => Brush::dither(self.dither_spec(), size),
            Tool::Brush
            | Tool::Stroke
            | Tool::Rect
            | Tool::Circle
            | Tool::Mirror
            | Tool::Bucket
            | Tool::Move
            | Tool::Eyedropper => Brush::round(self.paint_color(), size, self.blur),
        }
    }

    /// Adopt a sampled color and hand control back to the pencil.
    ///
    /// A fully transparent sample keeps the current color.
    pub fn apply_picked_color(&mut self, sample: Rgba<u8>) {
        if sample[3] > 0 {
            self.color = Rgba([sample[0], sample[1], sample[2], 255]);
            self.opacity = sample[3] as f32 / 255.0;
        }
        self.tool = Tool::Pencil;
    }
}

/// Convert a client-space pointer position into a buffer coordinate.
pub fn pointer_to_buffer(
    client: (f32, f32),
    origin: (f32, f32),
    zoom: f32,
) -> (i32, i32) {
    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    (((client.0 - origin.0) / zoom).floor() as i32, ((client.1 - origin.1) / zoom).floor() as i32)
}

/// Gesture lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging,
}

/// What a gesture event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Rejected: out of bounds, or no gesture in progress
    Ignored,
    /// A drag began
    Started,
    /// A drag continued
    Updated,
    /// The gesture is over (end event or instantaneous tool)
    Finished,
}

/// Ephemeral state of the gesture in progress.
#[derive(Debug, Clone, Default)]
pub struct ToolSession {
    state: GestureState,
    tool: Tool,
    drag_start: (i32, i32),
    last_pos: (i32, i32),
    working: Option<PixelBuffer>,
    preview: Option<PixelBuffer>,
}

impl ToolSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == GestureState::Dragging
    }

    /// Tool captured when the current gesture started.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn drag_start(&self) -> (i32, i32) {
        self.drag_start
    }

    /// Uncommitted preview (shape and move tools) to display instead of the
    /// active layer.
    pub fn preview(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref()
    }

    /// Discard the session without touching the layer further.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Handle a gesture start on `target`.
    ///
    /// A start while a gesture is already in progress discards the old
    /// session first. The eyedropper needs the frame composite, which the
    /// session does not see; callers resolve it and get `Finished` back here.
    pub fn start(
        &mut self,
        x: i32,
        y: i32,
        target: &mut PixelBuffer,
        settings: &ToolSettings,
        noise: &mut NoiseSource,
    ) -> GestureOutcome {
        if self.is_drawing() {
            debug!("discarding unfinished {} gesture", self.tool.name());
            self.cancel();
        }
        if !target.contains(x, y) {
            return GestureOutcome::Ignored;
        }

        let tool = settings.tool;
        let stamp = match tool {
            Tool::Bucket => {
                let filled = flood_fill(target, x as u32, y as u32, settings.paint_color());
                debug!("bucket fill at ({}, {}) wrote {} pixels", x, y, filled);
                return GestureOutcome::Finished;
            }
            Tool::Dither(DitherMode::Fill) => {
                let spec = settings.dither_spec();
                let filled = dither_fill(target, x as u32, y as u32, &spec, noise);
                debug!("dither fill at ({}, {}) wrote {} pixels", x, y, filled);
                return GestureOutcome::Finished;
            }
            Tool::Eyedropper => return GestureOutcome::Finished,
            Tool::Pencil | Tool::Brush | Tool::Eraser | Tool::Dither(DitherMode::Draw) => {
                vec![(x, y)]
            }
            Tool::Mirror => {
                let (w, h) = target.dimensions();
                mirrored_points(&[(x, y)], settings.mirror_axis, w, h)
            }
            Tool::Stroke | Tool::Rect | Tool::Circle | Tool::Move => Vec::new(),
        };

        self.tool = tool;
        self.state = GestureState::Dragging;
        self.drag_start = (x, y);
        self.last_pos = (x, y);
        let mut working = target.clone();
        if !stamp.is_empty() {
            plot_points(&mut working, &stamp, &settings.brush_for(tool), noise);
            target.clone_from(&working);
        }

        self.working = Some(working);
        GestureOutcome::Started
    }

    /// Handle a pointer move. Positions outside the buffer are ignored but
    /// keep the gesture alive.
    pub fn update(
        &mut self,
        x: i32,
        y: i32,
        target: &mut PixelBuffer,
        settings: &ToolSettings,
        noise: &mut NoiseSource,
    ) -> GestureOutcome {
        if !self.is_drawing() || !target.contains(x, y) {
            return GestureOutcome::Ignored;
        }
        let Some(working) = self.working.as_mut() else {
            return GestureOutcome::Ignored;
        };

        let tool = self.tool;
        let pos = (x, y);
        match tool {
            Tool::Pencil | Tool::Brush | Tool::Eraser | Tool::Dither(DitherMode::Draw) => {
                continue_line(working, self.last_pos, pos, &settings.brush_for(tool), noise);
                target.clone_from(working);
            }
            Tool::Mirror => {
                let (w, h) = working.dimensions();
                let line = rasterize_line(self.last_pos, pos);
                let fresh = line.get(1..).unwrap_or_default();
                let points = mirrored_points(fresh, settings.mirror_axis, w, h);
                plot_points(working, &points, &settings.brush_for(tool), noise);
                target.clone_from(working);
            }
            Tool::Stroke | Tool::Rect | Tool::Circle => {
                let mut preview = working.clone();
                let points = shape_points(tool, self.drag_start, pos);
                plot_points(&mut preview, &points, &settings.brush_for(tool), noise);
                self.preview = Some(preview);
            }
            Tool::Move => {
                let (dx, dy) = (x - self.drag_start.0, y - self.drag_start.1);
                self.preview = Some(working.shifted(dx, dy));
            }
            Tool::Bucket | Tool::Dither(DitherMode::Fill) | Tool::Eyedropper => {
                return GestureOutcome::Ignored;
            }
        }

        self.last_pos = pos;
        GestureOutcome::Updated
    }

    /// Handle the gesture end. An end outside the buffer commits at the last
    /// accepted position. Always returns the session to `Idle`.
    pub fn end(
        &mut self,
        x: i32,
        y: i32,
        target: &mut PixelBuffer,
        settings: &ToolSettings,
        noise: &mut NoiseSource,
    ) -> GestureOutcome {
        if !self.is_drawing() {
            return GestureOutcome::Ignored;
        }
        let pos = if target.contains(x, y) { (x, y) } else { self.last_pos };
        let tool = self.tool;
        let start = self.drag_start;

        if let Some(mut working) = self.working.take() {
            match tool {
                Tool::Stroke | Tool::Rect | Tool::Circle => {
                    let points = shape_points(tool, start, pos);
                    plot_points(&mut working, &points, &settings.brush_for(tool), noise);
                    *target = working;
                }
                Tool::Mirror => {
                    let (w, h) = working.dimensions();
                    let line = rasterize_line(start, pos);
                    let points = mirrored_points(&line, settings.mirror_axis, w, h);
                    plot_points(&mut working, &points, &settings.brush_for(tool), noise);
                    *target = working;
                }
                Tool::Move => {
                    *target = working.shifted(pos.0 - start.0, pos.1 - start.1);
                }
                Tool::Pencil
                | Tool::Brush
                | Tool::Eraser
                | Tool::Dither(_)
                | Tool::Bucket
                | Tool::Eyedropper => {}
            }
        }

        self.cancel();
        GestureOutcome::Finished
    }
}

/// Sample the composite for the eyedropper.
pub fn sample_color(composite: &PixelBuffer, x: i32, y: i32) -> Option<Rgba<u8>> {
    composite.pixel_at(x, y)
}

fn shape_points(tool: Tool, start: (i32, i32), end: (i32, i32)) -> Vec<(i32, i32)> {
    match tool {
        Tool::Rect => rasterize_rect_outline(start, end),
        Tool::Circle => rasterize_circle(start, end),
        _ => rasterize_line(start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TRANSPARENT;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn settings(tool: Tool) -> ToolSettings {
        ToolSettings { tool, color: RED, ..ToolSettings::default() }
    }

    fn painted(buf: &PixelBuffer) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..buf.height() {
            for x in 0..buf.width() {
                if buf.get_pixel(x, y).unwrap()[3] > 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// Replay a gesture: first point starts, middle points move, last ends.
    fn gesture(points: &[(i32, i32)], buf: &mut PixelBuffer, settings: &ToolSettings) {
        let mut session = ToolSession::new();
        let mut noise = NoiseSource::with_seed(7);
        let (first, rest) = points.split_first().unwrap();
        session.start(first.0, first.1, buf, settings, &mut noise);
        if let Some((last, moves)) = rest.split_last() {
            for &(x, y) in moves {
                session.update(x, y, buf, settings, &mut noise);
            }
            session.end(last.0, last.1, buf, settings, &mut noise);
        } else {
            session.end(first.0, first.1, buf, settings, &mut noise);
        }
        assert!(!session.is_drawing());
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!(Tool::from_str("Pencil", DitherMode::Draw), Some(Tool::Pencil));
        assert_eq!(Tool::from_str("dither", DitherMode::Fill), Some(Tool::Dither(DitherMode::Fill)));
        assert_eq!(Tool::from_str("lasso", DitherMode::Draw), None);
        assert!(Tool::Bucket.is_instant());
        assert!(!Tool::Dither(DitherMode::Draw).is_instant());
    }

    #[test]
    fn test_start_out_of_bounds_is_ignored() {
        let mut buf = PixelBuffer::new(4, 4);
        let mut session = ToolSession::new();
        let outcome =
            session.start(4, 0, &mut buf, &settings(Tool::Pencil), &mut NoiseSource::with_seed(0));
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert_eq!(session.state(), GestureState::Idle);
        assert!(buf.is_transparent());
    }

    #[test]
    fn test_pencil_stroke_connects_moves() {
        let mut buf = PixelBuffer::new(5, 5);
        gesture(&[(0, 0), (4, 0), (4, 0)], &mut buf, &settings(Tool::Pencil));
        assert_eq!(painted(&buf), vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_translucent_stroke_blends_joints_once() {
        let mut buf = PixelBuffer::new(5, 1);
        let s = ToolSettings { opacity: 0.5, ..settings(Tool::Pencil) };
        gesture(&[(0, 0), (2, 0), (4, 0), (4, 0)], &mut buf, &s);
        let alphas: Vec<u8> = (0..5).map(|x| buf.get_pixel(x, 0).unwrap()[3]).collect();
        assert!(alphas[0] > 0);
        assert!(alphas.iter().all(|&a| a == alphas[0]), "alphas: {:?}", alphas);
    }

    #[test]
    fn test_move_outside_keeps_gesture_alive() {
        let mut buf = PixelBuffer::new(4, 4);
        let s = settings(Tool::Pencil);
        let mut noise = NoiseSource::with_seed(0);
        let mut session = ToolSession::new();
        session.start(0, 0, &mut buf, &s, &mut noise);
        assert_eq!(session.update(9, 9, &mut buf, &s, &mut noise), GestureOutcome::Ignored);
        assert!(session.is_drawing());
        session.update(0, 2, &mut buf, &s, &mut noise);
        assert_eq!(session.end(9, 9, &mut buf, &s, &mut noise), GestureOutcome::Finished);
        assert_eq!(painted(&buf), vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_rect_preview_then_commit() {
        let mut buf = PixelBuffer::new(4, 4);
        let s = settings(Tool::Rect);
        let mut noise = NoiseSource::with_seed(0);
        let mut session = ToolSession::new();
        assert_eq!(session.start(0, 0, &mut buf, &s, &mut noise), GestureOutcome::Started);
        session.update(2, 2, &mut buf, &s, &mut noise);
        assert!(buf.is_transparent(), "layer untouched during preview");
        assert_eq!(painted(session.preview().unwrap()).len(), 8);

        session.end(3, 3, &mut buf, &s, &mut noise);
        assert!(session.preview().is_none());
        assert_eq!(painted(&buf).len(), 12);
        for interior in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            assert_eq!(buf.get_pixel(interior.0, interior.1), Ok(TRANSPARENT));
        }
    }

    #[test]
    fn test_circle_commit() {
        let mut buf = PixelBuffer::new(9, 9);
        gesture(&[(4, 4), (6, 4)], &mut buf, &settings(Tool::Circle));
        let pixels = painted(&buf);
        assert!(pixels.contains(&(6, 4)));
        assert!(pixels.contains(&(2, 4)));
        assert!(!pixels.contains(&(4, 4)));
    }

    #[test]
    fn test_stroke_tool_draws_straight_line() {
        let mut buf = PixelBuffer::new(5, 5);
        // the preview at (4, 4) is discarded; only origin to end is committed
        gesture(&[(0, 0), (4, 4), (0, 4)], &mut buf, &settings(Tool::Stroke));
        assert_eq!(painted(&buf), vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
    }

    #[test]
    fn test_bucket_finishes_immediately() {
        let mut buf = PixelBuffer::new(3, 3);
        let mut session = ToolSession::new();
        let outcome =
            session.start(1, 1, &mut buf, &settings(Tool::Bucket), &mut NoiseSource::with_seed(0));
        assert_eq!(outcome, GestureOutcome::Finished);
        assert!(!session.is_drawing());
        assert_eq!(painted(&buf).len(), 9);
    }

    #[test]
    fn test_bucket_uses_opacity() {
        let mut buf = PixelBuffer::new(2, 2);
        let s = ToolSettings { opacity: 0.5, ..settings(Tool::Bucket) };
        gesture(&[(0, 0)], &mut buf, &s);
        assert_eq!(buf.get_pixel(1, 1), Ok(Rgba([255, 0, 0, 128])));
    }

    #[test]
    fn test_dither_fill_mode() {
        let mut buf = PixelBuffer::filled(2, 2, RED);
        let s = ToolSettings {
            dither_color1: Rgba([1, 1, 1, 255]),
            dither_color2: Rgba([2, 2, 2, 255]),
            dither_density: 10,
            ..settings(Tool::Dither(DitherMode::Fill))
        };
        gesture(&[(0, 0)], &mut buf, &s);
        assert_eq!(buf.get_pixel(0, 0), Ok(Rgba([1, 1, 1, 255])));
        assert_eq!(buf.get_pixel(1, 0), Ok(Rgba([2, 2, 2, 255])));
    }

    #[test]
    fn test_mirror_tool_plots_reflections() {
        let mut buf = PixelBuffer::new(6, 6);
        let s = ToolSettings { mirror_axis: MirrorAxis::Both, ..settings(Tool::Mirror) };
        gesture(&[(1, 1), (1, 1)], &mut buf, &s);
        assert_eq!(painted(&buf), vec![(1, 1), (4, 1), (1, 4), (4, 4)]);
    }

    #[test]
    fn test_move_tool_shifts_on_end() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.put(0, 0, RED);
        buf.put(3, 3, RED);
        let s = settings(Tool::Move);
        let mut noise = NoiseSource::with_seed(0);
        let mut session = ToolSession::new();
        session.start(1, 1, &mut buf, &s, &mut noise);
        session.update(2, 2, &mut buf, &s, &mut noise);
        assert_eq!(buf.get_pixel(0, 0), Ok(RED), "layer untouched during preview");
        assert_eq!(session.preview().unwrap().get_pixel(1, 1), Ok(RED));
        session.end(2, 1, &mut buf, &s, &mut noise);
        // shift by (1, 0): (3,3) falls off, (0,0) lands on (1,0)
        assert_eq!(painted(&buf), vec![(1, 0)]);
    }

    #[test]
    fn test_new_start_discards_old_session() {
        let mut buf = PixelBuffer::new(4, 4);
        let rect = settings(Tool::Rect);
        let pencil = settings(Tool::Pencil);
        let mut noise = NoiseSource::with_seed(0);
        let mut session = ToolSession::new();
        session.start(0, 0, &mut buf, &rect, &mut noise);
        session.update(3, 3, &mut buf, &rect, &mut noise);
        session.start(2, 2, &mut buf, &pencil, &mut noise);
        assert_eq!(session.tool(), Tool::Pencil);
        assert!(session.preview().is_none());
        session.end(2, 2, &mut buf, &pencil, &mut noise);
        assert_eq!(painted(&buf), vec![(2, 2)]);
    }

    #[test]
    fn test_apply_picked_color() {
        let mut s = settings(Tool::Eyedropper);
        s.apply_picked_color(Rgba([10, 20, 30, 51]));
        assert_eq!(s.tool, Tool::Pencil);
        assert_eq!(s.color, Rgba([10, 20, 30, 255]));
        assert!((s.opacity - 0.2).abs() < 1e-6);

        let mut s = settings(Tool::Eyedropper);
        s.apply_picked_color(TRANSPARENT);
        assert_eq!(s.color, RED);
        assert_eq!(s.tool, Tool::Pencil);
    }

    #[test]
    fn test_pointer_to_buffer() {
        assert_eq!(pointer_to_buffer((105.0, 57.0), (100.0, 50.0), 2.0), (2, 3));
        assert_eq!(pointer_to_buffer((99.0, 50.0), (100.0, 50.0), 4.0), (-1, 0));
    }
}
