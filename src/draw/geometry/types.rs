//! Core geometry types for chip segment data
//!
//! This module contains the primitives shared by every pipeline stage:
//! integer vertices, segment descriptors, node spans, contours and triangles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A scaled and offset vertex. Coordinates are non-negative and fit the
/// 16-bit vertex format consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub x: u16,
    pub y: u16,
}

impl Vertex {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Identifier of a connected node. Every segment belongs to exactly one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub u16);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rendering plane index (diffusion, metal, polysilicon, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerIndex(pub u8);

impl LayerIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One polygon record: a contiguous slice of the global vertex store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub node: NodeIndex,
    pub layer: LayerIndex,
    pub start: usize,
    pub count: usize,
}

impl Segment {
    pub fn vertex_range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

/// Directory entry for a node: where its segments start and how many it owns.
/// Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeSpan {
    pub first_segment: usize,
    pub first_layer: LayerIndex,
    pub num_segments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    Boundary,
    Hole,
}

/// A closed ring of vertices split out of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub kind: ContourKind,
    pub vertices: Vec<Vertex>,
    /// Indices into the segment's vertex slice covered by this ring,
    /// including the vertex that closed it.
    pub span: Range<usize>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A generated triangle tagged with the node that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub node: NodeIndex,
}

impl Triangle {
    /// Twice the unsigned area, exact in integer arithmetic
    pub fn doubled_area(&self) -> i64 {
        let [a, b, c] = self.vertices;
        let (ax, ay) = (a.x as i64, a.y as i64);
        let (bx, by) = (b.x as i64, b.y as i64);
        let (cx, cy) = (c.x as i64, c.y as i64);
        ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).abs()
    }
}

/// Running bounding extents over all scanned vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extents {
    pub min_x: u16,
    pub min_y: u16,
    pub max_x: u16,
    pub max_y: u16,
}

impl Extents {
    pub fn from_vertex(v: Vertex) -> Self {
        Self {
            min_x: v.x,
            min_y: v.y,
            max_x: v.x,
            max_y: v.y,
        }
    }

    pub fn include(&mut self, v: Vertex) {
        self.min_x = self.min_x.min(v.x);
        self.min_y = self.min_y.min(v.y);
        self.max_x = self.max_x.max(v.x);
        self.max_y = self.max_y.max(v.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_doubled_area_ignores_winding() {
        let ccw = Triangle {
            vertices: [Vertex::new(0, 0), Vertex::new(4, 0), Vertex::new(0, 3)],
            node: NodeIndex(1),
        };
        let cw = Triangle {
            vertices: [Vertex::new(0, 0), Vertex::new(0, 3), Vertex::new(4, 0)],
            node: NodeIndex(1),
        };
        assert_eq!(ccw.doubled_area(), 12);
        assert_eq!(cw.doubled_area(), 12);
    }

    #[test]
    fn test_extents_grow() {
        let mut ext = Extents::from_vertex(Vertex::new(10, 20));
        ext.include(Vertex::new(5, 30));
        ext.include(Vertex::new(12, 1));
        assert_eq!(ext, Extents { min_x: 5, min_y: 1, max_x: 12, max_y: 30 });
    }
}
