//! CLI dispatch for the `pxe draw` command.
//!
//! Loads a project, resolves tool settings (pxe.toml overlaid with the
//! command-line flags), replays one gesture through the editor and writes
//! the project back.

use std::path::Path;
use std::process::ExitCode;

use crate::color::{parse_color, to_hex};
use crate::config::EditorConfig;
use crate::dither::{DitherMode, DitherPattern, NoiseSource};
use crate::editor::Editor;
use crate::mirror::MirrorAxis;
use crate::project::save_project;
use crate::tools::{Tool, ToolSettings};

use super::{load_editor_config, open_project, parse_points, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Gesture and settings flags of `pxe draw`.
#[derive(Debug, Default)]
pub struct DrawArgs {
    pub frame: usize,
    pub layer: Option<usize>,
    pub tool: Option<String>,
    pub points: String,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub size: Option<u32>,
    pub blur: Option<u32>,
    pub mirror: Option<String>,
    pub color1: Option<String>,
    pub color2: Option<String>,
    pub pattern: Option<String>,
    pub density: Option<u8>,
    pub dither_mode: Option<String>,
    pub seed: Option<u64>,
}

/// Overlay command-line flags on the configured settings.
fn resolve_settings(config: &EditorConfig, args: &DrawArgs) -> Result<ToolSettings, String> {
    let mut settings = config.tool_settings();

    let dither_mode = match &args.dither_mode {
        Some(s) => DitherMode::from_str(s).ok_or_else(|| format!("unknown dither mode '{}'", s))?,
        None => config.dither.mode,
    };
    if let Some(name) = &args.tool {
        settings.tool =
            Tool::from_str(name, dither_mode).ok_or_else(|| format!("unknown tool '{}'", name))?;
    } else if let Tool::Dither(_) = settings.tool {
        settings.tool = Tool::Dither(dither_mode);
    }

    if let Some(c) = &args.color {
        settings.color = parse_color(c).map_err(|e| format!("--color: {}", e))?;
    }
    if let Some(opacity) = args.opacity {
        if !(0.0..=1.0).contains(&opacity) {
            return Err("--opacity must be between 0.0 and 1.0".to_string());
        }
        settings.opacity = opacity;
    }
    if let Some(size) = args.size {
        settings.brush_size = size;
    }
    if let Some(blur) = args.blur {
        settings.blur = blur;
    }
    if let Some(axis) = &args.mirror {
        settings.mirror_axis =
            MirrorAxis::from_str(axis).ok_or_else(|| format!("unknown mirror axis '{}'", axis))?;
    }
    if let Some(c) = &args.color1 {
        settings.dither_color1 = parse_color(c).map_err(|e| format!("--color1: {}", e))?;
    }
    if let Some(c) = &args.color2 {
        settings.dither_color2 = parse_color(c).map_err(|e| format!("--color2: {}", e))?;
    }
    if let Some(p) = &args.pattern {
        settings.dither_pattern =
            DitherPattern::from_str(p).ok_or_else(|| format!("unknown dither pattern '{}'", p))?;
    }
    if let Some(density) = args.density {
        settings.dither_density = density;
    }

    Ok(settings)
}

/// Execute the draw command.
pub fn run_draw(
    config_path: Option<&Path>,
    input: &Path,
    args: &DrawArgs,
    output: Option<&Path>,
    dry_run: bool,
) -> ExitCode {
    let config = match load_editor_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let settings = match resolve_settings(&config, args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let points = match parse_points(&args.points) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: --points: {}", msg);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let document = match open_project(input) {
        Ok(doc) => doc,
        Err(code) => return code,
    };
    let layer = args.layer.unwrap_or(document.layer_count() - 1);

    let mut editor = Editor::with_document(document, settings);
    if let Some(seed) = args.seed {
        editor.set_noise_source(NoiseSource::with_seed(seed));
    }
    if let Err(e) = editor.select_frame(args.frame).and_then(|_| editor.set_active_layer(layer)) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let active = editor.document().active_layer();
    if !active.visible {
        eprintln!("Warning: layer '{}' is hidden, nothing drawn", active.name);
        return ExitCode::from(EXIT_SUCCESS);
    }
    let before = active.buffer.clone();
    let tool = editor.settings().tool;

    editor.gesture(&points);

    if tool == Tool::Eyedropper {
        let picked = editor.settings();
        println!("{} opacity {:.3}", to_hex(picked.color), picked.opacity);
        return ExitCode::from(EXIT_SUCCESS);
    }

    let after = &editor.document().active_layer().buffer;
    let changed = before
        .as_raw()
        .chunks_exact(4)
        .zip(after.as_raw().chunks_exact(4))
        .filter(|(a, b)| a != b)
        .count();

    if dry_run {
        println!(
            "{}: {} pixel(s) would change on frame {} layer {}",
            tool.name(),
            changed,
            args.frame,
            layer
        );
        return ExitCode::from(EXIT_SUCCESS);
    }

    if changed == 0 {
        println!("No changes.");
        return ExitCode::from(EXIT_SUCCESS);
    }

    let target = output.unwrap_or(input);
    match save_project(editor.document(), target) {
        Ok(()) => {
            eprintln!("Wrote: {} ({} pixel(s) changed)", target.display(), changed);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
