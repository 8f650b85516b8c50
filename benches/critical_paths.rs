//! Criterion benchmarks for pixedit critical paths
//!
//! Benchmarks the operations that run on every pointer event or export:
//! - Shapes: Bresenham line and midpoint circle rasterization
//! - Fill: scanline flood fill over open and maze-like regions
//! - Composite: flattening a layer stack
//! - Spritesheet: compositing every frame of a document

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::Rgba;
use pixedit::brush::{draw_line, Brush};
use pixedit::buffer::PixelBuffer;
use pixedit::composite::render;
use pixedit::dither::NoiseSource;
use pixedit::document::Document;
use pixedit::fill::flood_fill;
use pixedit::shapes::{rasterize_circle_radius, rasterize_line};
use pixedit::spritesheet::document_spritesheet;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 128]);

// =============================================================================
// Test Data Generators
// =============================================================================

/// Buffer with horizontal walls leaving a one-pixel gap at alternating ends,
/// so the fill region is a single serpentine corridor.
fn make_maze(size: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(size, size);
    for y in (1..size).step_by(2) {
        let gap = if (y / 2) % 2 == 0 { size - 1 } else { 0 };
        for x in 0..size {
            if x != gap {
                buf.put(x as i32, y as i32, RED);
            }
        }
    }
    buf
}

/// Document with `layers` half-transparent layers on `frames` frames.
fn make_document(size: u32, layers: usize, frames: usize) -> Document {
    let mut doc = Document::new(size, size).unwrap();
    for _ in 1..layers {
        doc.add_layer(None);
    }
    for _ in 1..frames {
        doc.duplicate_frame();
    }
    for frame in 0..frames {
        doc.select_frame(frame).unwrap();
        for layer in 0..layers {
            doc.set_active_layer(layer).unwrap();
            doc.active_layer_mut().buffer.fill(BLUE);
        }
    }
    doc
}

// =============================================================================
// Shapes
// =============================================================================

fn bench_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("shapes");

    for len in [16, 256, 4096] {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("line", len), &len, |b, &len| {
            b.iter(|| rasterize_line(black_box((0, 0)), black_box((len, len / 3))))
        });
    }

    group.bench_function("circle_r64", |b| {
        b.iter(|| rasterize_circle_radius(black_box((128, 128)), black_box(64)))
    });

    group.bench_function("brush_line_size5_128px", |b| {
        let brush = Brush::round(RED, 5, 0);
        let mut noise = NoiseSource::with_seed(1);
        b.iter_batched_ref(
            || PixelBuffer::new(128, 128),
            |buf| draw_line(buf, (0, 0), (127, 90), &brush, &mut noise),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// =============================================================================
// Flood fill
// =============================================================================

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    for size in [64u32, 256] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, &size| {
            b.iter_batched_ref(
                || PixelBuffer::new(size, size),
                |buf| flood_fill(buf, 0, 0, RED),
                criterion::BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("maze", size), &size, |b, &size| {
            let maze = make_maze(size);
            b.iter_batched_ref(
                || maze.clone(),
                |buf| flood_fill(buf, 0, 0, BLUE),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

// =============================================================================
// Compositing
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");

    for layers in [1usize, 4, 16] {
        let doc = make_document(128, layers, 1);
        group.bench_with_input(BenchmarkId::new("layers_128px", layers), &doc, |b, doc| {
            b.iter(|| render(black_box(doc.current_frame()), doc.width(), doc.height()))
        });
    }

    let doc = make_document(64, 4, 24);
    group.bench_function("spritesheet_24_frames", |b| {
        b.iter(|| document_spritesheet(black_box(&doc)))
    });

    group.finish();
}

criterion_group!(benches, bench_shapes, bench_fill, bench_composite);
criterion_main!(benches);
