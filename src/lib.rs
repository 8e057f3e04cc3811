//! segmesh: chip segment geometry to GPU triangles and a picking grid
//!
//! The pipeline reads a segment definition stream (one polygon record per
//! line), splits each record into boundary and hole rings, triangulates them,
//! appends the triangles to per-layer vertex buffers and buckets every
//! triangle into a uniform picking grid. The results are written out by the
//! `emit` module and can be queried with `pick`.
//!
//! # Example
//! ```ignore
//! let config = PipelineConfig::default();
//! let output = run_pipeline("segdefs.js", &config)?;
//! write_tables(&output.tables, Path::new("segdefs.bin"), config.format)?;
//! ```

pub mod config;
pub mod draw;
pub mod emit;
pub mod error;
pub mod logging;
pub mod pick;

use indexmap::IndexMap;
use std::path::Path;

pub use config::{NodeRemap, OutputFormat, PipelineConfig};
pub use draw::generation::{GridStats, PipelineRun};
pub use draw::geometry::{NodeIndex, NodeSpan};
pub use draw::parsing::{scan_file, scan_records, ScanOutput};
pub use emit::{write_tables, EmittedTables};
pub use error::{Diagnostics, Result, SegmeshError};
pub use pick::{LayerMask, PickIndex, PickResult};

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub tables: EmittedTables,
    pub diagnostics: Diagnostics,
    pub grid_stats: GridStats,
    /// Segment directory per node, in order of first appearance
    pub nodes: IndexMap<NodeIndex, NodeSpan>,
}

/// Run triangulation and grid building over already scanned segments
pub fn build_tables(scan: ScanOutput, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    let mut run = PipelineRun::new(scan, config.clone());
    run.generate();

    let PipelineRun { scan, layers, grid, diagnostics, .. } = run;
    let grid = grid.finish();
    let grid_stats = grid.stats();
    let tables = EmittedTables::from_parts(scan.extents, layers, grid);

    if !diagnostics.is_clean() {
        tracing::warn!(?diagnostics, "input had data-quality problems");
    }

    Ok(PipelineOutput {
        tables,
        diagnostics,
        grid_stats,
        nodes: scan.nodes,
    })
}

/// Scan a segment definition file and build all output tables
pub fn run_pipeline<P: AsRef<Path>>(input: P, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    let scan = scan_file(input, config)?;
    build_tables(scan, config)
}
