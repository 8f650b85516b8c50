//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod draw;
mod info;
mod new;
mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, EditorConfig};
use crate::document::Document;
use crate::project::load_project;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// pixedit - headless pixel-art sprite editor
#[derive(Parser)]
#[command(name = "pxe")]
#[command(about = "pixedit - edit layered, animated pixel-art sprite projects from the command line")]
#[command(version)]
pub struct Cli {
    /// Use this pxe.toml instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new empty project
    New {
        /// Project file to create
        output: PathBuf,

        /// Canvas width in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=4096))]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=4096))]
        height: u32,

        /// Number of empty frames
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=1024))]
        frames: u32,

        /// Playback rate
        #[arg(long, default_value = "12", value_parser = clap::value_parser!(u32).range(1..=120))]
        fps: u32,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show project size, frames and layers
    Info {
        /// Project file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply one pointer gesture to a layer
    ///
    /// The first point starts the gesture, the last one ends it and any
    /// points in between are moves. Settings not given here come from pxe.toml.
    Draw {
        /// Project file
        input: PathBuf,

        /// Frame to draw on
        #[arg(long, default_value = "0")]
        frame: usize,

        /// Layer to draw on (default: the top layer)
        #[arg(long)]
        layer: Option<usize>,

        /// pencil, brush, eraser, bucket, dither, stroke, rect, circle, mirror, move, eyedropper
        #[arg(short, long)]
        tool: Option<String>,

        /// Gesture points: "x,y;x,y;..."
        #[arg(short, long, value_name = "POINTS")]
        points: String,

        /// Primary color (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
        #[arg(short, long)]
        color: Option<String>,

        /// Primary color opacity 0.0-1.0
        #[arg(long)]
        opacity: Option<f32>,

        /// Brush size in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=256))]
        size: Option<u32>,

        /// Soft edge width for brush and eraser
        #[arg(long)]
        blur: Option<u32>,

        /// Mirror axis for the mirror tool (none, x, y, both)
        #[arg(long)]
        mirror: Option<String>,

        /// First dither color
        #[arg(long)]
        color1: Option<String>,

        /// Second dither color
        #[arg(long)]
        color2: Option<String>,

        /// Dither pattern (checkerboard, diagonal, horizontal, vertical, random)
        #[arg(long)]
        pattern: Option<String>,

        /// Dither density 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        density: Option<u8>,

        /// Dither mode (draw, fill)
        #[arg(long)]
        dither_mode: Option<String>,

        /// Seed for the random dither pattern
        #[arg(long)]
        seed: Option<u64>,

        /// Output project file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Render one frame to PNG
    Render {
        /// Project file
        input: PathBuf,

        /// Frame to render
        #[arg(long, default_value = "0")]
        frame: usize,

        /// Output file (default: {input}_frame{N}.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: Option<u8>,

        /// Show neighbouring frames as tinted ghosts
        #[arg(long)]
        onion: bool,
    },

    /// Render all frames left to right into one PNG
    Spritesheet {
        /// Project file
        input: PathBuf,

        /// Output file (default: {input}_sheet.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: Option<u8>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::New { output, width, height, frames, fps, force } => {
            new::run_new(&output, width, height, frames, fps, force)
        }
        Commands::Info { input, json } => info::run_info(&input, json),
        Commands::Draw {
            input,
            frame,
            layer,
            tool,
            points,
            color,
            opacity,
            size,
            blur,
            mirror,
            color1,
            color2,
            pattern,
            density,
            dither_mode,
            seed,
            output,
            dry_run,
        } => draw::run_draw(
            config,
            &input,
            &draw::DrawArgs {
                frame,
                layer,
                tool,
                points,
                color,
                opacity,
                size,
                blur,
                mirror,
                color1,
                color2,
                pattern,
                density,
                dither_mode,
                seed,
            },
            output.as_deref(),
            dry_run,
        ),
        Commands::Render { input, frame, output, scale, onion } => {
            render::run_render(config, &input, frame, output.as_deref(), scale, onion)
        }
        Commands::Spritesheet { input, output, scale } => {
            render::run_spritesheet(config, &input, output.as_deref(), scale)
        }
    }
}

/// Load pxe.toml, printing the error on failure.
pub(crate) fn load_editor_config(path: Option<&Path>) -> Result<EditorConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Load a project, printing the error on failure.
pub(crate) fn open_project(input: &Path) -> Result<Document, ExitCode> {
    load_project(input).map_err(|e| {
        eprintln!("Error: Cannot load project '{}': {}", input.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Parse `"x,y;x,y"` into buffer coordinates.
pub(crate) fn parse_points(s: &str) -> Result<Vec<(i32, i32)>, String> {
    let points = s
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (x, y) = p.split_once(',').ok_or_else(|| format!("invalid point '{}': expected x,y", p))?;
            let x = x.trim().parse::<i32>().map_err(|_| format!("invalid x in point '{}'", p))?;
            let y = y.trim().parse::<i32>().map_err(|_| format!("invalid y in point '{}'", p))?;
            Ok((x, y))
        })
        .collect::<Result<Vec<_>, String>>()?;

    if points.is_empty() {
        return Err("at least one point is required".to_string());
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("0,0"), Ok(vec![(0, 0)]));
        assert_eq!(parse_points("1,2; 3,4;-1,5;"), Ok(vec![(1, 2), (3, 4), (-1, 5)]));
    }

    #[test]
    fn test_parse_points_errors() {
        assert!(parse_points("").is_err());
        assert!(parse_points("1").is_err());
        assert!(parse_points("a,2").is_err());
        assert!(parse_points("1,2;3,").is_err());
    }

    #[test]
    fn test_parse_draw_args() {
        let cli = Cli::try_parse_from([
            "pxe", "draw", "a.json", "--tool", "rect", "--points", "0,0;3,3", "--size", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Draw { tool, points, size, frame, .. } => {
                assert_eq!(tool.as_deref(), Some("rect"));
                assert_eq!(points, "0,0;3,3");
                assert_eq!(size, Some(2));
                assert_eq!(frame, 0);
            }
            _ => panic!("expected draw"),
        }
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let result =
            Cli::try_parse_from(["pxe", "draw", "a.json", "--points", "0,0", "--density", "11"]);
        assert!(result.is_err());
    }
}
