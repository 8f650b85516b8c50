//! Project persistence
//!
//! A project is a JSON document holding the canvas size, playback rate and
//! every frame's layer stack. Layer pixels are stored losslessly as base64
//! PNG data:
//!
//! ```json
//! {
//!   "version": 1,
//!   "width": 16, "height": 16, "fps": 12,
//!   "frames": [
//!     { "layers": [ { "name": "Layer 1", "visible": true, "data": "iVBORw0K..." } ] }
//!   ]
//! }
//! ```
//!
//! Decoding is synchronous: a buffer is fully decoded before it is returned.
//! Loading fails as a whole on the first bad layer; nothing is partially
//! applied.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::document::{Document, DocumentError, Frame, Layer};

/// Current project format version.
pub const PROJECT_VERSION: u32 = 1;

/// Prefix of browser-style data URLs, accepted on decode.
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base64 layer data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("layer '{layer}' in frame {frame} is {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        frame: usize,
        layer: String,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("unsupported project version {0} (newest known is {})", PROJECT_VERSION)]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Serialized project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    pub frames: Vec<ProjectFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFrame {
    pub layers: Vec<ProjectLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLayer {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Base64 PNG of the layer buffer
    pub data: String,
}

fn default_fps() -> u32 {
    crate::document::DEFAULT_FPS
}

fn default_visible() -> bool {
    true
}

/// Encode a buffer as base64 PNG.
pub fn encode(buffer: &PixelBuffer) -> Result<String, ProjectError> {
    let mut bytes = Vec::new();
    let (width, height) = buffer.dimensions();
    PngEncoder::new(&mut bytes).write_image(buffer.as_raw(), width, height, ColorType::Rgba8)?;
    Ok(STANDARD.encode(bytes))
}

/// Decode base64 PNG data (optionally a `data:image/png;base64,` URL).
pub fn decode(data: &str) -> Result<PixelBuffer, ProjectError> {
    let payload = data.trim();
    let payload = payload.strip_prefix(DATA_URL_PREFIX).unwrap_or(payload);
    let bytes = STANDARD.decode(payload)?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
    Ok(PixelBuffer::from_image(image.to_rgba8()))
}

impl ProjectFile {
    /// Capture every frame of `document`.
    pub fn from_document(document: &Document) -> Result<Self, ProjectError> {
        let frames = document
            .frames()
            .iter()
            .map(|frame| {
                let layers = frame
                    .layers
                    .iter()
                    .map(|layer| {
                        Ok(ProjectLayer {
                            name: layer.name.clone(),
                            visible: layer.visible,
                            data: encode(&layer.buffer)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ProjectError>>()?;
                Ok(ProjectFrame { layers })
            })
            .collect::<Result<Vec<_>, ProjectError>>()?;

        Ok(Self {
            version: PROJECT_VERSION,
            width: document.width(),
            height: document.height(),
            fps: document.fps(),
            frames,
        })
    }

    /// Decode every layer and rebuild the document.
    pub fn into_document(self) -> Result<Document, ProjectError> {
        if self.version > PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion(self.version));
        }

        let mut frames = Vec::with_capacity(self.frames.len());
        for (fi, frame) in self.frames.into_iter().enumerate() {
            let mut layers = Vec::with_capacity(frame.layers.len());
            for layer in frame.layers {
                let buffer = decode(&layer.data)?;
                let (actual_width, actual_height) = buffer.dimensions();
                if (actual_width, actual_height) != (self.width, self.height) {
                    return Err(ProjectError::SizeMismatch {
                        frame: fi,
                        layer: layer.name,
                        width: self.width,
                        height: self.height,
                        actual_width,
                        actual_height,
                    });
                }
                layers.push(Layer { name: layer.name, visible: layer.visible, buffer });
            }
            frames.push(Frame { layers });
        }

        Ok(Document::from_frames(self.width, self.height, self.fps, frames)?)
    }
}

/// Serialize a document to pretty-printed project JSON.
pub fn to_json(document: &Document) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(&ProjectFile::from_document(document)?)?)
}

/// Parse project JSON into a document.
pub fn from_json(json: &str) -> Result<Document, ProjectError> {
    let file: ProjectFile = serde_json::from_str(json)?;
    file.into_document()
}

/// Write a project file, creating parent directories as needed.
pub fn save_project(document: &Document, path: &Path) -> Result<(), ProjectError> {
    let json = to_json(document)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;
    info!(
        "saved {}x{} project with {} frame(s) to {}",
        document.width(),
        document.height(),
        document.frame_count(),
        path.display()
    );
    Ok(())
}

/// Read a project file.
pub fn load_project(path: &Path) -> Result<Document, ProjectError> {
    let json = fs::read_to_string(path)?;
    let document = from_json(&json)?;
    debug!(
        "loaded {} ({}x{}, {} frame(s), {} layer(s))",
        path.display(),
        document.width(),
        document.height(),
        document.frame_count(),
        document.layer_count()
    );
    Ok(document)
}
