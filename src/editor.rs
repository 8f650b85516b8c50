//! Editor controller
//!
//! [`Editor`] owns the document, its undo history, the gesture session, the
//! tool settings and the noise source for random dithering. UI collaborators
//! talk to the engine only through it: pointer events in, composite and layer
//! metadata out.
//!
//! History covers the current frame. Every gesture that changes pixels records
//! exactly one snapshot after its final write. Frame switches and structural
//! edits (layer add/delete/move/rename/visibility, frame add/delete/move,
//! resize) re-seed the stack with the new state.

use image::Rgba;
use log::{debug, info};

use crate::buffer::PixelBuffer;
use crate::composite::composite_over;
use crate::document::{Document, DocumentError, LayerInfo};
use crate::dither::NoiseSource;
use crate::history::{History, HistoryEntry};
use crate::mirror::{mirror_buffer, MirrorAxis};
use crate::tools::{sample_color, GestureOutcome, Tool, ToolSession, ToolSettings};

/// The editing engine.
#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    history: History,
    session: ToolSession,
    settings: ToolSettings,
    noise: NoiseSource,
}

impl Editor {
    /// A fresh single-frame, single-layer document with default settings.
    pub fn new(width: u32, height: u32) -> Result<Self, DocumentError> {
        Ok(Self::with_document(Document::new(width, height)?, ToolSettings::default()))
    }

    /// Wrap an existing document. History starts with its current state.
    pub fn with_document(document: Document, settings: ToolSettings) -> Self {
        let mut editor = Self {
            document,
            history: History::new(settings.max_history),
            session: ToolSession::new(),
            settings,
            noise: NoiseSource::default(),
        };
        editor.reseed_history();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Replace the tool settings. A new history depth applies immediately.
    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.history.set_max_history(settings.max_history);
        self.settings = settings;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.tool = tool;
    }

    /// Use a specific noise source, e.g. a seeded one for reproducible output.
    pub fn set_noise_source(&mut self, noise: NoiseSource) {
        self.noise = noise;
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_drawing()
    }

    // -- gestures --------------------------------------------------------

    /// Begin a gesture at buffer coordinate `(x, y)`.
    pub fn pointer_down(&mut self, x: i32, y: i32) -> GestureOutcome {
        // sampling reads the composite, so a hidden active layer does not block it
        if self.settings.tool == Tool::Eyedropper {
            self.session.cancel();
            return match sample_color(&self.composite(), x, y) {
                Some(color) => {
                    debug!("picked {:?} at ({}, {})", color, x, y);
                    self.settings.apply_picked_color(color);
                    GestureOutcome::Finished
                }
                None => GestureOutcome::Ignored,
            };
        }

        if !self.document.active_layer().visible {
            debug!("active layer '{}' is hidden, ignoring gesture", self.document.active_layer().name);
            self.session.cancel();
            return GestureOutcome::Ignored;
        }

        let target = &mut self.document.active_layer_mut().buffer;
        let outcome = self.session.start(x, y, target, &self.settings, &mut self.noise);
        if outcome == GestureOutcome::Finished {
            self.commit_if_changed();
        }
        outcome
    }

    /// Continue the gesture in progress.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> GestureOutcome {
        if !self.session.is_drawing() {
            return GestureOutcome::Ignored;
        }
        let target = &mut self.document.active_layer_mut().buffer;
        self.session.update(x, y, target, &self.settings, &mut self.noise)
    }

    /// Finish the gesture in progress and record it in history.
    pub fn pointer_up(&mut self, x: i32, y: i32) -> GestureOutcome {
        if !self.session.is_drawing() {
            return GestureOutcome::Ignored;
        }
        let target = &mut self.document.active_layer_mut().buffer;
        let outcome = self.session.end(x, y, target, &self.settings, &mut self.noise);
        self.commit_if_changed();
        outcome
    }

    /// Replay a full gesture: the first point starts, the last ends, the rest
    /// are moves. A single point is a click.
    pub fn gesture(&mut self, points: &[(i32, i32)]) {
        let Some((&(x, y), rest)) = points.split_first() else {
            return;
        };
        if self.pointer_down(x, y) != GestureOutcome::Started {
            return;
        }
        match rest.split_last() {
            Some((&(ex, ey), moves)) => {
                for &(mx, my) in moves {
                    self.pointer_move(mx, my);
                }
                self.pointer_up(ex, ey);
            }
            None => {
                self.pointer_up(x, y);
            }
        }
    }

    // -- history ---------------------------------------------------------

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.session.cancel();
        match self.history.undo() {
            Some(entry) => {
                let entry = entry.clone();
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.session.cancel();
        match self.history.redo() {
            Some(entry) => {
                let entry = entry.clone();
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// `(position, length)` of the history stack.
    pub fn history_position(&self) -> (usize, usize) {
        (self.history.position(), self.history.len())
    }

    // -- output ----------------------------------------------------------

    /// Composite of the current frame. A pending shape or move preview is
    /// shown in place of the active layer.
    pub fn composite(&self) -> PixelBuffer {
        let frame = self.document.current_frame();
        let active = self.document.active_layer_index();
        let preview = self.session.preview();

        let mut out = PixelBuffer::new(self.document.width(), self.document.height());
        for (index, layer) in frame.layers.iter().enumerate() {
            if !layer.visible {
                continue;
            }
            let buffer = match preview {
                Some(preview) if index == active => preview,
                _ => &layer.buffer,
            };
            composite_over(&mut out, buffer);
        }
        out
    }

    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.document.layer_infos()
    }

    /// Color of the composite at `(x, y)`, if inside the canvas.
    pub fn sample(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        sample_color(&self.composite(), x, y)
    }

    // -- layers ----------------------------------------------------------

    pub fn add_layer(&mut self, name: Option<&str>) -> usize {
        let index = self.document.add_layer(name);
        info!("added layer {}", index);
        self.structure_changed();
        index
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<(), DocumentError> {
        self.document.delete_layer(index)?;
        info!("deleted layer {}", index);
        self.structure_changed();
        Ok(())
    }

    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.document.move_layer(from, to)?;
        self.structure_changed();
        Ok(())
    }

    /// Rename a layer in every frame.
    ///
    /// Names and visibility are shared by all frames while history snapshots
    /// only the current frame, so these metadata edits re-seed history too.
    /// Undoing across them would desync the current frame from the rest.
    pub fn rename_layer(&mut self, index: usize, name: &str) -> Result<(), DocumentError> {
        self.document.rename_layer(index, name)?;
        self.structure_changed();
        Ok(())
    }

    /// Show or hide a layer in every frame. Re-seeds history like [`Editor::rename_layer`].
    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<(), DocumentError> {
        self.document.set_layer_visible(index, visible)?;
        self.structure_changed();
        Ok(())
    }

    /// Flip a layer's visibility and return the new state. Re-seeds history.
    pub fn toggle_layer_visibility(&mut self, index: usize) -> Result<bool, DocumentError> {
        let visible = self.document.toggle_layer_visibility(index)?;
        self.structure_changed();
        Ok(visible)
    }

    pub fn set_active_layer(&mut self, index: usize) -> Result<(), DocumentError> {
        self.session.cancel();
        self.document.set_active_layer(index)
    }

    /// Reflect the active layer's pixels. Undoable.
    pub fn mirror_layer(&mut self, axis: MirrorAxis) {
        if axis == MirrorAxis::None {
            return;
        }
        self.session.cancel();
        let layer = self.document.active_layer_mut();
        layer.buffer = mirror_buffer(&layer.buffer, axis);
        self.commit_if_changed();
    }

    /// Erase the active layer. Undoable.
    pub fn clear_layer(&mut self) {
        self.session.cancel();
        self.document.active_layer_mut().buffer.clear();
        self.commit_if_changed();
    }

    // -- frames ----------------------------------------------------------

    pub fn add_frame(&mut self) -> usize {
        let index = self.document.add_frame();
        info!("added frame {}", index);
        self.structure_changed();
        index
    }

    pub fn duplicate_frame(&mut self) -> usize {
        let index = self.document.duplicate_frame();
        info!("duplicated frame into {}", index);
        self.structure_changed();
        index
    }

    pub fn delete_frame(&mut self, index: usize) -> Result<(), DocumentError> {
        self.document.delete_frame(index)?;
        info!("deleted frame {}", index);
        self.structure_changed();
        Ok(())
    }

    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.document.move_frame(from, to)?;
        self.structure_changed();
        Ok(())
    }

    /// Switch the current frame. History restarts for the new frame.
    pub fn select_frame(&mut self, index: usize) -> Result<(), DocumentError> {
        if index == self.document.current_frame_index() {
            return Ok(());
        }
        self.document.select_frame(index)?;
        debug!("selected frame {}", index);
        self.structure_changed();
        Ok(())
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.document.set_fps(fps);
    }

    /// Reallocate every buffer at a new canvas size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DocumentError> {
        self.document.resize(width, height)?;
        info!("resized canvas to {}x{}", width, height);
        self.structure_changed();
        Ok(())
    }

    // -- internals -------------------------------------------------------

    fn entry(&self) -> HistoryEntry {
        HistoryEntry {
            frame: self.document.current_frame_index(),
            active_layer: self.document.active_layer_index(),
            layers: self.document.current_frame().layers.clone(),
        }
    }

    fn structure_changed(&mut self) {
        self.session.cancel();
        self.reseed_history();
    }

    fn reseed_history(&mut self) {
        let entry = self.entry();
        self.history.reset(entry);
    }

    /// Snapshot the current frame if it differs from the live history entry.
    fn commit_if_changed(&mut self) {
        let frame = self.document.current_frame_index();
        let changed = match self.history.current() {
            Some(entry) => {
                entry.frame != frame || entry.layers != self.document.current_frame().layers
            }
            None => true,
        };
        if changed {
            let entry = self.entry();
            self.history.snapshot(entry);
            debug!("history snapshot {}/{}", self.history.position() + 1, self.history.len());
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        let HistoryEntry { active_layer, layers, .. } = entry;
        self.document.replace_current_layers(layers);
        if self.document.set_active_layer(active_layer).is_err() {
            debug!("restored active layer {} no longer exists", active_layer);
        }
    }
}
