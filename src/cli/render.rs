//! Render and spritesheet command implementations

use std::path::Path;
use std::process::ExitCode;

use crate::composite::render;
use crate::onion::document_onion_skin;
use crate::output::{output_path, save_png, scale_buffer};
use crate::spritesheet::document_spritesheet;

use super::{load_editor_config, open_project, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
    config_path: Option<&Path>,
    input: &Path,
    frame: usize,
    output: Option<&Path>,
    scale: Option<u8>,
    onion: bool,
) -> ExitCode {
    let config = match load_editor_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let document = match open_project(input) {
        Ok(doc) => doc,
        Err(code) => return code,
    };

    let image = if onion {
        if frame >= document.frame_count() {
            eprintln!("Error: no frame at index {} ({} frame(s))", frame, document.frame_count());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        document_onion_skin(&document, frame, &config.onion_config())
    } else {
        match document.frame(frame) {
            Ok(f) => render(f, document.width(), document.height()),
            Err(e) => {
                eprintln!("Error: {} ({} frame(s))", e, document.frame_count());
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    };

    let image = scale_buffer(image, scale.unwrap_or(config.export.scale));
    let path = output_path(input, &format!("frame{}", frame), output);
    match save_png(&image, &path) {
        Ok(()) => {
            println!("Saved: {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to save '{}': {}", path.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the spritesheet command
pub fn run_spritesheet(
    config_path: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    scale: Option<u8>,
) -> ExitCode {
    let config = match load_editor_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let document = match open_project(input) {
        Ok(doc) => doc,
        Err(code) => return code,
    };

    let sheet = scale_buffer(document_spritesheet(&document), scale.unwrap_or(config.export.scale));
    let path = output_path(input, "sheet", output);
    match save_png(&sheet, &path) {
        Ok(()) => {
            println!(
                "Saved: {} ({} frame(s), {}x{})",
                path.display(),
                document.frame_count(),
                sheet.width(),
                sheet.height()
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to save '{}': {}", path.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
