//! `pxe info` - describe a project

use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use crate::document::Document;

use super::{open_project, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Serialize)]
struct ProjectSummary {
    width: u32,
    height: u32,
    fps: u32,
    frames: usize,
    layers: Vec<LayerSummary>,
}

#[derive(Serialize)]
struct LayerSummary {
    index: usize,
    name: String,
    visible: bool,
    /// Non-transparent pixels per frame
    painted: Vec<usize>,
}

fn summarize(document: &Document) -> ProjectSummary {
    let layers = document
        .layer_infos()
        .into_iter()
        .map(|info| {
            let painted = document
                .frames()
                .iter()
                .map(|frame| {
                    frame.layers[info.index].buffer.as_raw().chunks_exact(4).filter(|p| p[3] > 0).count()
                })
                .collect();
            LayerSummary { index: info.index, name: info.name, visible: info.visible, painted }
        })
        .collect();

    ProjectSummary {
        width: document.width(),
        height: document.height(),
        fps: document.fps(),
        frames: document.frame_count(),
        layers,
    }
}

/// Execute the info command
pub fn run_info(input: &Path, json: bool) -> ExitCode {
    let document = match open_project(input) {
        Ok(doc) => doc,
        Err(code) => return code,
    };
    let summary = summarize(&document);

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{}", input.display());
    println!("  Size:   {}x{}", summary.width, summary.height);
    println!("  FPS:    {}", summary.fps);
    println!("  Frames: {}", summary.frames);
    println!("  Layers: {}", summary.layers.len());
    for layer in &summary.layers {
        let hidden = if layer.visible { "" } else { " (hidden)" };
        let painted: Vec<String> = layer.painted.iter().map(usize::to_string).collect();
        println!(
            "    [{}] {}{}  painted: {}",
            layer.index,
            layer.name,
            hidden,
            painted.join(" ")
        );
    }
    ExitCode::from(EXIT_SUCCESS)
}
