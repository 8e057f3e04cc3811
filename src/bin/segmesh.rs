//! Command line driver: segment definitions in, render and picking tables out
//!
//! Usage:
//!   cargo run --release --bin segmesh -- <segdefs_file> -o <output> [options]
//!
//! Options:
//!   --config <file.json>     Load pipeline settings from JSON
//!   --scale <f>              Coordinate scale factor
//!   --grid-cells <n>         Picking grid cells per axis
//!   --max-layers <n>         Number of rendering layers
//!   --format <binary|json|msgpack|c>  Output format
//!   --serial                 Triangulate on one thread
//!   --pick <x,y>             Report nodes under a point after building
//!   --summary                Show summary stats only
//!   --verbose                Debug logging

use anyhow::{bail, Context};
use segmesh::logging::init_logging;
use segmesh::{run_pipeline, write_tables, LayerMask, OutputFormat, PickIndex, PipelineConfig};
use std::env;
use std::path::PathBuf;

fn print_usage(program: &str) {
    eprintln!("Usage: {} <segdefs_file> -o <output> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file.json>               Load pipeline settings from JSON");
    eprintln!("  --scale <f>                        Coordinate scale factor (default 1.0)");
    eprintln!("  --grid-cells <n>                   Picking grid cells per axis (default 128)");
    eprintln!("  --max-layers <n>                   Number of rendering layers (default 6)");
    eprintln!("  --format <binary|json|msgpack|c>   Output format (default binary)");
    eprintln!("  --serial                           Triangulate on one thread");
    eprintln!("  --pick <x,y>                       Report nodes under a point");
    eprintln!("  --summary                          Show summary stats only");
    eprintln!("  --verbose                          Debug logging");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} segdefs.js -o segdefs.bin", program);
    eprintln!("  {} z80/segdefs.js -o segdefs.c --format c --scale 2", program);
    eprintln!("  {} segdefs.js -o tables.json --format json --pick 4352,8340", program);
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("{} needs a value", flag))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("segmesh");

    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(program);
        return Ok(());
    }

    let input = PathBuf::from(&args[1]);
    let mut output: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut scale: Option<f64> = None;
    let mut grid_cells: Option<u32> = None;
    let mut max_layers: Option<usize> = None;
    let mut format: Option<OutputFormat> = None;
    let mut serial = false;
    let mut pick_point: Option<(f32, f32)> = None;
    let mut summary_only = false;
    let mut verbose = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => output = Some(PathBuf::from(next_value(&args, &mut i, "--output")?)),
            "--config" => config_path = Some(PathBuf::from(next_value(&args, &mut i, "--config")?)),
            "--scale" => scale = Some(next_value(&args, &mut i, "--scale")?.parse::<f64>().context("--scale")?),
            "--grid-cells" => {
                grid_cells = Some(next_value(&args, &mut i, "--grid-cells")?.parse::<u32>().context("--grid-cells")?)
            }
            "--max-layers" => {
                max_layers = Some(next_value(&args, &mut i, "--max-layers")?.parse::<usize>().context("--max-layers")?)
            }
            "--format" => format = Some(next_value(&args, &mut i, "--format")?.parse::<OutputFormat>()?),
            "--serial" => serial = true,
            "--pick" => {
                let value = next_value(&args, &mut i, "--pick")?;
                let parts: Vec<&str> = value.split(',').collect();
                if parts.len() != 2 {
                    bail!("--pick expects x,y, got '{}'", value);
                }
                pick_point = Some((parts[0].trim().parse::<f32>()?, parts[1].trim().parse::<f32>()?));
            }
            "--summary" => summary_only = true,
            "--verbose" => verbose = true,
            other => bail!("unknown option '{}'", other),
        }
        i += 1;
    }

    init_logging(verbose)?;

    let mut config = match &config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(s) = scale {
        config.scale = s;
    }
    if let Some(n) = grid_cells {
        config.grid_cells = n;
    }
    if let Some(n) = max_layers {
        config.max_layers = n;
    }
    if let Some(f) = format {
        config.format = f;
    }
    if serial {
        config.parallel = false;
    }
    config.validate()?;

    let out = run_pipeline(&input, &config)
        .with_context(|| format!("processing {}", input.display()))?;
    let tables = &out.tables;

    if let Some(path) = &output {
        let written = write_tables(tables, path, config.format)
            .with_context(|| format!("writing {}", path.display()))?;
        for file in &written {
            eprintln!("Wrote {}", file.display());
        }
    } else {
        eprintln!("No output file given (-o), tables were not written");
    }

    if !summary_only {
        println!("=== Coordinate space ===");
        println!("  x: {}..={}", tables.min_x, tables.max_x);
        println!("  y: {}..={}", tables.min_y, tables.max_y);
        println!("  grid: {0}x{0}", tables.grid_cells);
        println!();
        println!("=== Layers ===");
        for layer in &tables.layers {
            println!("  layer {}: {} triangles", layer.layer, layer.triangle_count());
        }
        println!();
    }

    println!("=== Summary ===");
    println!("  Nodes: {}", out.nodes.len());
    println!("  Triangles: {}", tables.total_triangles());
    println!("  Pick entries: {}", tables.pick_tris.len());
    println!("  Empty cells: {}", out.grid_stats.empty_cells);
    println!("  Max entries per cell: {}", out.grid_stats.max_entries);
    println!("  Mean entries per cell: {:.2}", out.grid_stats.mean_entries);
    let d = &out.diagnostics;
    println!("  Skipped lines: {}", d.unparseable_lines);
    println!("  Degenerate contours: {}", d.degenerate_contours);
    println!("  Empty segments: {}", d.empty_segments);
    println!("  Deviating triangulations: {}", d.deviating_segments);
    println!("  Failed triangulations: {}", d.failed_triangulations);

    if let Some((x, y)) = pick_point {
        let index = PickIndex::new(tables);
        let hits = index.pick(x, y, &LayerMask::all(config.max_layers));
        println!();
        println!("=== Nodes at ({}, {}) ===", x, y);
        if hits.nodes.is_empty() {
            println!("  none");
        }
        for node in &hits.nodes {
            match out.nodes.get(node) {
                Some(span) => println!(
                    "  node {} ({} segments, first on layer {})",
                    node, span.num_segments, span.first_layer
                ),
                None => println!("  node {}", node),
            }
        }
    }

    Ok(())
}
