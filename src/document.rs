//! Frame / layer document model
//!
//! A [`Document`] is an ordered sequence of animation [`Frame`]s. Every frame
//! holds the same layer structure (count, order, names, visibility); only the
//! pixel content differs per frame. All structural operations below are
//! applied to every frame at once so that invariant holds by construction.
//!
//! Layer index 0 is the bottom of the stack.

use serde::Serialize;
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Default playback rate for new documents.
pub const DEFAULT_FPS: u32 = 12;

/// Refusals from structural document operations.
///
/// Every refusal is raised before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Width or height of zero
    #[error("invalid document size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    /// Deleting the only layer
    #[error("cannot delete the last layer")]
    LastLayer,
    /// Deleting the only frame
    #[error("cannot delete the last frame")]
    LastFrame,
    /// Layer index out of range
    #[error("no layer at index {0}")]
    NoSuchLayer(usize),
    /// Frame index out of range
    #[error("no frame at index {0}")]
    NoSuchFrame(usize),
    /// Externally supplied frames that violate the document invariants
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// One buffer plus its name and visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub buffer: PixelBuffer,
}

impl Layer {
    /// A visible, fully transparent layer.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self { name: name.into(), visible: true, buffer: PixelBuffer::new(width, height) }
    }

    /// An empty layer with the same name and visibility as `self`.
    fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            visible: self.visible,
            buffer: PixelBuffer::new(self.buffer.width(), self.buffer.height()),
        }
    }
}

/// One animation step: a stack of layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub layers: Vec<Layer>,
}

impl Frame {
    /// A frame with the same layer structure as `self` and empty buffers.
    fn empty_like(&self) -> Self {
        Self { layers: self.layers.iter().map(Layer::empty_like).collect() }
    }
}

/// Layer metadata for a layer panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub index: usize,
    pub name: String,
    pub visible: bool,
    pub active: bool,
}

/// The editable sprite: frames of structurally synchronized layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    width: u32,
    height: u32,
    fps: u32,
    frames: Vec<Frame>,
    current_frame: usize,
    active_layer: usize,
}

impl Document {
    /// Create a document with one frame holding one empty layer.
    pub fn new(width: u32, height: u32) -> Result<Self, DocumentError> {
        if width == 0 || height == 0 {
            return Err(DocumentError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            fps: DEFAULT_FPS,
            frames: vec![Frame { layers: vec![Layer::new("Layer 1", width, height)] }],
            current_frame: 0,
            active_layer: 0,
        })
    }

    /// Assemble a document from externally supplied frames.
    ///
    /// Rejects empty frame or layer lists, frames whose layer names, counts or
    /// visibility diverge, and buffers whose size differs from the document size.
    pub fn from_frames(
        width: u32,
        height: u32,
        fps: u32,
        frames: Vec<Frame>,
    ) -> Result<Self, DocumentError> {
        if width == 0 || height == 0 {
            return Err(DocumentError::InvalidSize { width, height });
        }
        let Some(first) = frames.first() else {
            return Err(DocumentError::Malformed("document has no frames".to_string()));
        };
        if first.layers.is_empty() {
            return Err(DocumentError::Malformed("frame 0 has no layers".to_string()));
        }
        let names: Vec<(&str, bool)> =
            first.layers.iter().map(|l| (l.name.as_str(), l.visible)).collect();

        for (fi, frame) in frames.iter().enumerate() {
            let frame_names: Vec<(&str, bool)> =
                frame.layers.iter().map(|l| (l.name.as_str(), l.visible)).collect();
            if frame_names != names {
                return Err(DocumentError::Malformed(format!(
                    "frame {} layers {:?} do not match frame 0 layers {:?}",
                    fi, frame_names, names
                )));
            }
            for layer in &frame.layers {
                if layer.buffer.dimensions() != (width, height) {
                    let (w, h) = layer.buffer.dimensions();
                    return Err(DocumentError::Malformed(format!(
                        "layer '{}' in frame {} is {}x{}, expected {}x{}",
                        layer.name, fi, w, h, width, height
                    )));
                }
            }
        }

        Ok(Self { width, height, fps: fps.max(1), frames, current_frame: 0, active_layer: 0 })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn layer_count(&self) -> usize {
        self.frames[0].layers.len()
    }

    pub fn frame(&self, index: usize) -> Result<&Frame, DocumentError> {
        self.frames.get(index).ok_or(DocumentError::NoSuchFrame(index))
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.current_frame]
    }

    pub fn current_frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.current_frame]
    }

    pub fn active_layer_index(&self) -> usize {
        self.active_layer
    }

    /// The active layer of the current frame.
    pub fn active_layer(&self) -> &Layer {
        &self.frames[self.current_frame].layers[self.active_layer]
    }

    pub fn active_layer_mut(&mut self) -> &mut Layer {
        &mut self.frames[self.current_frame].layers[self.active_layer]
    }

    pub fn set_active_layer(&mut self, index: usize) -> Result<(), DocumentError> {
        self.check_layer(index)?;
        self.active_layer = index;
        Ok(())
    }

    pub fn select_frame(&mut self, index: usize) -> Result<(), DocumentError> {
        self.check_frame(index)?;
        self.current_frame = index;
        Ok(())
    }

    /// Layer list of the current frame, bottom first.
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.current_frame()
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerInfo {
                index,
                name: layer.name.clone(),
                visible: layer.visible,
                active: index == self.active_layer,
            })
            .collect()
    }

    /// Append an empty layer to every frame and make it active.
    ///
    /// Returns the new layer's index.
    pub fn add_layer(&mut self, name: Option<&str>) -> usize {
        let index = self.layer_count();
        let name = name.map(str::to_string).unwrap_or_else(|| format!("Layer {}", index + 1));
        for frame in &mut self.frames {
            frame.layers.push(Layer::new(name.clone(), self.width, self.height));
        }
        self.active_layer = index;
        self.check_structure();
        index
    }

    /// Remove the layer at `index` from every frame.
    pub fn delete_layer(&mut self, index: usize) -> Result<(), DocumentError> {
        self.check_layer(index)?;
        if self.layer_count() == 1 {
            return Err(DocumentError::LastLayer);
        }
        for frame in &mut self.frames {
            frame.layers.remove(index);
        }
        if self.active_layer >= self.layer_count() || self.active_layer > index {
            self.active_layer = self.active_layer.saturating_sub(1);
        }
        self.check_structure();
        Ok(())
    }

    /// Move a layer from one stack position to another in every frame.
    ///
    /// The active layer follows the moved layer when it was the one moved.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.check_layer(from)?;
        self.check_layer(to)?;
        if from == to {
            return Ok(());
        }
        for frame in &mut self.frames {
            let layer = frame.layers.remove(from);
            frame.layers.insert(to, layer);
        }
        self.active_layer = follow_move(self.active_layer, from, to);
        self.check_structure();
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> Result<(), DocumentError> {
        self.check_layer(index)?;
        for frame in &mut self.frames {
            frame.layers[index].name = name.to_string();
        }
        Ok(())
    }

    /// Set a layer's visibility in every frame.
    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<(), DocumentError> {
        self.check_layer(index)?;
        for frame in &mut self.frames {
            frame.layers[index].visible = visible;
        }
        Ok(())
    }

    /// Flip a layer's visibility; returns the new state.
    pub fn toggle_layer_visibility(&mut self, index: usize) -> Result<bool, DocumentError> {
        self.check_layer(index)?;
        let visible = !self.current_frame().layers[index].visible;
        self.set_layer_visible(index, visible)?;
        Ok(visible)
    }

    /// Insert an empty frame (same layer structure) after the current one and
    /// select it.
    pub fn add_frame(&mut self) -> usize {
        let frame = self.current_frame().empty_like();
        self.insert_after_current(frame)
    }

    /// Deep-copy the current frame, insert it after the current one and
    /// select it.
    pub fn duplicate_frame(&mut self) -> usize {
        let frame = self.current_frame().clone();
        self.insert_after_current(frame)
    }

    pub fn delete_frame(&mut self, index: usize) -> Result<(), DocumentError> {
        self.check_frame(index)?;
        if self.frames.len() == 1 {
            return Err(DocumentError::LastFrame);
        }
        self.frames.remove(index);
        if self.current_frame >= self.frames.len() || self.current_frame > index {
            self.current_frame = self.current_frame.saturating_sub(1);
        }
        Ok(())
    }

    /// Move a frame to another position. The current frame stays selected,
    /// wherever it ends up.
    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.check_frame(from)?;
        self.check_frame(to)?;
        if from == to {
            return Ok(());
        }
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);
        self.current_frame = follow_move(self.current_frame, from, to);
        Ok(())
    }

    /// Reallocate every buffer at a new size, keeping the top-left overlap.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DocumentError> {
        if width == 0 || height == 0 {
            return Err(DocumentError::InvalidSize { width, height });
        }
        for frame in &mut self.frames {
            for layer in &mut frame.layers {
                layer.buffer = layer.buffer.resize(width, height);
            }
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Replace the current frame's layer list (history restore).
    ///
    /// `layers` must have the document's current structure.
    pub(crate) fn replace_current_layers(&mut self, layers: Vec<Layer>) {
        debug_assert_eq!(layers.len(), self.layer_count(), "restored layer count diverged");
        self.frames[self.current_frame].layers = layers;
        self.check_structure();
    }

    /// Assert the structural sync invariant in debug builds.
    pub fn check_structure(&self) {
        if cfg!(debug_assertions) {
            let reference = &self.frames[0];
            for frame in &self.frames {
                debug_assert_eq!(frame.layers.len(), reference.layers.len(), "layer count desync");
                for (a, b) in frame.layers.iter().zip(&reference.layers) {
                    debug_assert_eq!(a.name, b.name, "layer order desync");
                    debug_assert_eq!(a.visible, b.visible, "layer visibility desync");
                }
            }
            debug_assert!(self.active_layer < reference.layers.len());
            debug_assert!(self.current_frame < self.frames.len());
        }
    }

    fn insert_after_current(&mut self, frame: Frame) -> usize {
        let index = self.current_frame + 1;
        self.frames.insert(index, frame);
        self.current_frame = index;
        self.check_structure();
        index
    }

    fn check_layer(&self, index: usize) -> Result<(), DocumentError> {
        if index < self.layer_count() {
            Ok(())
        } else {
            Err(DocumentError::NoSuchLayer(index))
        }
    }

    fn check_frame(&self, index: usize) -> Result<(), DocumentError> {
        if index < self.frames.len() {
            Ok(())
        } else {
            Err(DocumentError::NoSuchFrame(index))
        }
    }
}

/// Where the item at `index` lands after the item at `from` moves to `to`.
fn follow_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
