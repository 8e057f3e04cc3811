//! Geometry module for chip segment data
//!
//! This module provides the geometric types shared by the scanner, the
//! tessellation stages and the picking grid.
//!
//! # Submodules
//! - `types` - Core primitives (Vertex, Segment, Contour, Triangle, ...)
//! - `area` - Exact integer area helpers used by the triangulation check

mod types;
mod area;

pub use types::{
    Vertex,
    NodeIndex,
    LayerIndex,
    Segment,
    NodeSpan,
    ContourKind,
    Contour,
    Triangle,
    Extents,
};

pub use area::{
    signed_doubled_area,
    ring_doubled_area,
};
