//! `pxe new` - create an empty project

use std::path::Path;
use std::process::ExitCode;

use crate::document::Document;
use crate::project::save_project;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the new command
pub fn run_new(
    output: &Path,
    width: u32,
    height: u32,
    frames: u32,
    fps: u32,
    force: bool,
) -> ExitCode {
    if output.exists() && !force {
        eprintln!("Error: '{}' already exists (use --force to overwrite)", output.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let mut document = match Document::new(width, height) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    document.set_fps(fps);
    for _ in 1..frames {
        document.add_frame();
    }

    match save_project(&document, output) {
        Ok(()) => {
            println!(
                "Created {}x{} project with {} frame(s) at {}",
                width,
                height,
                document.frame_count(),
                output.display()
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
