//! Triangle and picking grid generation
//!
//! This module runs the tessellation stages over every scanned segment and
//! collects the results into per-layer vertex buffers and a picking grid.
//!
//! # Submodules
//! - `buffers` - Per-layer triangle list vertex buffers
//! - `grid` - Picking grid accumulation and flattening

mod buffers;
mod grid;

use crate::config::PipelineConfig;
use crate::draw::geometry::*;
use crate::draw::parsing::ScanOutput;
use crate::draw::tessellation::{split_contours, triangulate_contours, ContourSplit, Tessellation};
use crate::error::Diagnostics;
use crate::logging::DebugLayers;
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub use buffers::{LayerVertexBuffer, PackedVertex};
pub use grid::{CellRange, GridMapping, GridStats, PickGrid, PickGridBuilder, PickTriangle};

/// Split and triangulation result for one segment
#[derive(Debug, Clone, Default)]
pub struct SegmentOutcome {
    pub split: ContourSplit,
    pub tessellation: Tessellation,
}

/// Split and triangulate one segment's vertex slice
pub fn tessellate_segment(vertices: &[Vertex], node: NodeIndex) -> SegmentOutcome {
    let split = split_contours(vertices);
    let tessellation = if split.is_empty() {
        Tessellation::default()
    } else {
        triangulate_contours(&split.contours, node)
    };
    SegmentOutcome { split, tessellation }
}

/// Everything built during one pipeline run
#[derive(Debug)]
pub struct PipelineRun {
    pub config: PipelineConfig,
    pub scan: ScanOutput,
    /// One buffer per layer, indexed by layer
    pub layers: Vec<LayerVertexBuffer>,
    pub grid: PickGridBuilder,
    pub diagnostics: Diagnostics,
    /// Layers whose triangles are dumped at debug level
    pub debug_layers: DebugLayers,
}

impl PipelineRun {
    pub fn new(scan: ScanOutput, config: PipelineConfig) -> Self {
        let num_layers = config.max_layers;
        // A ring of n vertices yields about n triangles at most once holes
        // are bridged; three packed vertices each.
        let layers = (0..num_layers)
            .map(|l| {
                let hint = scan.layer_vertex_counts.get(l).copied().unwrap_or(0) * 3;
                LayerVertexBuffer::with_capacity(LayerIndex(l as u8), hint)
            })
            .collect();
        let grid = PickGridBuilder::new(config.grid_cells, num_layers, scan.extents);
        let diagnostics = Diagnostics {
            unparseable_lines: scan.skipped_lines,
            ..Default::default()
        };
        Self {
            config,
            scan,
            layers,
            grid,
            diagnostics,
            debug_layers: DebugLayers::from_env(),
        }
    }

    /// Tessellate every segment. Results come back in segment order whether
    /// or not the rayon pool was used.
    pub fn tessellate_all(&self) -> Vec<SegmentOutcome> {
        let scan = &self.scan;
        if self.config.parallel {
            scan.segments
                .par_iter()
                .map(|seg| tessellate_segment(scan.segment_vertices(seg), seg.node))
                .collect()
        } else {
            scan.segments
                .iter()
                .map(|seg| tessellate_segment(scan.segment_vertices(seg), seg.node))
                .collect()
        }
    }

    /// Append one segment's triangles to its layer buffer and the grid.
    /// Must be called in segment order to keep triangle indices stable.
    pub fn append_segment(&mut self, segment_index: usize, outcome: &SegmentOutcome) {
        let segment = &self.scan.segments[segment_index];
        let (node, layer) = (segment.node, segment.layer);

        let degenerate = outcome.split.degenerate_loops();
        if degenerate > 0 {
            warn!(segment = segment_index, %node, %layer, degenerate, "dropped degenerate contours");
            self.diagnostics.degenerate_contours += degenerate;
        }
        if outcome.split.is_empty() {
            warn!(segment = segment_index, %node, %layer, vertices = segment.count, "segment has no usable contour, skipped");
            self.diagnostics.empty_segments += 1;
            return;
        }

        let tess = &outcome.tessellation;
        if tess.failed {
            warn!(segment = segment_index, %node, %layer, "earcut produced no triangles");
            self.diagnostics.failed_triangulations += 1;
        }
        if !tess.check.is_exact() {
            warn!(
                segment = segment_index,
                %node,
                %layer,
                deviation = tess.check.deviation(),
                expected = tess.check.expected,
                actual = tess.check.actual,
                "incorrect triangulation"
            );
            self.diagnostics.deviating_segments += 1;
        }

        let dump = self.debug_layers.includes(layer.0);
        let buffer = &mut self.layers[layer.as_usize()];
        for triangle in &tess.triangles {
            let index = buffer.push_triangle(triangle);
            self.grid.insert_triangle(layer, index, triangle);
            if dump {
                let [a, b, c] = triangle.vertices;
                debug!(
                    %layer,
                    index,
                    %node,
                    "triangle [{}, {}], [{}, {}], [{}, {}]",
                    a.x, a.y, b.x, b.y, c.x, c.y
                );
            }
        }
    }

    /// Tessellate all segments and append them in order
    pub fn generate(&mut self) {
        let start = std::time::Instant::now();
        let outcomes = self.tessellate_all();
        debug!(
            segments = outcomes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            parallel = self.config.parallel,
            "tessellated segments"
        );

        for (i, outcome) in outcomes.iter().enumerate() {
            self.append_segment(i, outcome);
        }

        for buffer in self.layers.iter().filter(|b| !b.is_empty()) {
            info!(layer = %buffer.layer, triangles = buffer.triangle_count(), "layer vertex buffer");
        }
        info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "generated triangles"
        );
    }

    pub fn total_triangles(&self) -> usize {
        self.layers.iter().map(LayerVertexBuffer::triangle_count).sum()
    }
}
