//! Geometry pipeline stages
//!
//! # Submodules
//! - `geometry` - Shared geometric types
//! - `parsing` - Segment record scanning
//! - `tessellation` - Contour splitting and triangulation
//! - `generation` - Vertex buffers and the picking grid

pub mod geometry;
pub mod parsing;
pub mod tessellation;
pub mod generation;
