//! PNG output and file path generation

use image::imageops::FilterType;
use std::io;
use std::path::{Path, PathBuf};

use crate::buffer::PixelBuffer;

/// Largest accepted integer scale factor.
pub const MAX_SCALE: u8 = 16;

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Save a buffer as a PNG file, creating parent directories as needed.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    buffer.as_image().save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Scale a buffer by an integer factor using nearest-neighbor sampling.
///
/// This keeps pixel edges crisp. Factors of 0 and 1 return the buffer
/// unchanged; larger factors are capped at [`MAX_SCALE`].
pub fn scale_buffer(buffer: PixelBuffer, factor: u8) -> PixelBuffer {
    if factor <= 1 {
        return buffer;
    }
    let factor = factor.min(MAX_SCALE) as u32;
    let (w, h) = buffer.dimensions();
    PixelBuffer::from_image(image::imageops::resize(
        buffer.as_image(),
        w * factor,
        h * factor,
        FilterType::Nearest,
    ))
}

/// Default PNG path next to a project file.
///
/// `sprite.json` with suffix `frame0` becomes `sprite_frame0.png` in the same
/// directory. An explicit `-o` path always wins.
pub fn output_path(project: &Path, suffix: &str, output_arg: Option<&Path>) -> PathBuf {
    if let Some(output) = output_arg {
        return output.to_path_buf();
    }
    let stem = project.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let file_name = format!("{}_{}.png", stem, suffix);
    match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
