//! pixedit - raster editing engine for pixel-art sprites
//!
//! This library provides:
//! - RGBA pixel buffers and a frame / layer document model for animation
//! - A rasterizer (brush stamps, Bresenham lines, rectangles, midpoint
//!   circles, scanline flood fill, dither patterns, mirroring)
//! - A pointer-gesture tool state machine with snapshot undo/redo
//! - Layer compositing, project persistence and PNG / spritesheet export

pub mod brush;
pub mod buffer;
pub mod cli;
pub mod color;
pub mod composite;
pub mod config;
pub mod dither;
pub mod document;
pub mod editor;
pub mod fill;
pub mod history;
pub mod mirror;
pub mod onion;
pub mod output;
pub mod project;
pub mod shapes;
pub mod spritesheet;
pub mod tools;
