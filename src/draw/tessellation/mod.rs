//! Tessellation module for segment polygons
//!
//! This module turns a segment's raw vertex slice into triangles.
//!
//! # Submodules
//! - `contours` - Splitting a vertex slice into boundary and hole rings
//! - `polygon` - Polygon-with-holes triangulation using earcut

mod contours;
mod polygon;

pub use contours::{
    MIN_CONTOUR_VERTICES,
    ContourSplit,
    split_contours,
};

pub use polygon::{
    AreaCheck,
    Tessellation,
    triangulate_contours,
};
