//! Segment definition scanning
//!
//! This module reads the line-oriented segment definition stream and builds
//! the global vertex store, the segment list and the node directory.
//!
//! # Submodules
//! - `records` - Single record line parsing and coordinate normalization

mod records;

use crate::config::PipelineConfig;
use crate::draw::geometry::*;
use crate::error::{Result, SegmeshError};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

pub use records::{parse_record_line, scale_coordinate, LineRejection, RawRecord};

/// Everything the scanner learned about the input
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Global vertex store, in record order
    pub vertices: Vec<Vertex>,
    /// Segment descriptors, in record order
    pub segments: Vec<Segment>,
    /// Bounds of all accepted vertices, absent when nothing was scanned
    pub extents: Option<Extents>,
    /// First segment and segment count per node, in order of first appearance
    pub nodes: IndexMap<NodeIndex, NodeSpan>,
    /// Vertex totals per layer, used to pre-size the triangle buffers
    pub layer_vertex_counts: Vec<usize>,
    /// Record-shaped lines that were rejected
    pub skipped_lines: usize,
}

impl ScanOutput {
    pub fn new(max_layers: usize) -> Self {
        Self {
            layer_vertex_counts: vec![0; max_layers],
            ..Default::default()
        }
    }

    /// Vertex slice of one segment
    pub fn segment_vertices(&self, segment: &Segment) -> &[Vertex] {
        &self.vertices[segment.vertex_range()]
    }

    /// Append an accepted record under its (remapped) node index
    pub fn push_record(&mut self, node: NodeIndex, record: RawRecord) {
        let segment_index = self.segments.len();
        let start = self.vertices.len();
        let count = record.vertices.len();

        for &v in &record.vertices {
            match self.extents.as_mut() {
                Some(ext) => ext.include(v),
                None => self.extents = Some(Extents::from_vertex(v)),
            }
        }
        self.vertices.extend_from_slice(&record.vertices);

        let layer = record.layer.as_usize();
        if layer >= self.layer_vertex_counts.len() {
            self.layer_vertex_counts.resize(layer + 1, 0);
        }
        self.layer_vertex_counts[layer] += count;

        self.nodes
            .entry(node)
            .and_modify(|span| span.num_segments += 1)
            .or_insert(NodeSpan {
                first_segment: segment_index,
                first_layer: record.layer,
                num_segments: 1,
            });

        self.segments.push(Segment {
            node,
            layer: record.layer,
            start,
            count,
        });
    }
}

/// Scan a segment definition stream. Lines that are not records, or records
/// that fail to parse, are skipped; only a read failure aborts.
pub fn scan_records<R: BufRead>(reader: R, config: &PipelineConfig, source: &Path) -> Result<ScanOutput> {
    let mut out = ScanOutput::new(config.max_layers);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source_err| SegmeshError::ReadInput {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let accepted = parse_record_line(&line, config.scale, config.max_layers).and_then(|record| {
            let node = config
                .remap_node(record.node)
                .ok_or(LineRejection::NodeOutOfRange(record.node))?;
            Ok((node, record))
        });
        match accepted {
            Ok((node, record)) => out.push_record(node, record),
            Err(LineRejection::NotARecord) => {}
            Err(reason) => {
                warn!(line = line_no + 1, %reason, "skipping unparseable segment record");
                out.skipped_lines += 1;
            }
        }
    }

    info!(
        segments = out.segments.len(),
        vertices = out.vertices.len(),
        nodes = out.nodes.len(),
        skipped = out.skipped_lines,
        "scanned segment definitions"
    );
    if let Some(ext) = out.extents {
        debug!(
            min_x = ext.min_x,
            min_y = ext.min_y,
            max_x = ext.max_x,
            max_y = ext.max_y,
            "coordinate extents"
        );
    }

    Ok(out)
}

/// Open and scan a segment definition file
pub fn scan_file<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<ScanOutput> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SegmeshError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    scan_records(BufReader::new(file), config, path)
}
