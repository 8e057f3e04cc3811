//! Error handling for segmesh
//!
//! Only fatal conditions are errors: reading the input, writing the output,
//! a bad configuration, or a serializer failure. Data-quality problems in the
//! segment records are logged and counted in [`Diagnostics`] instead.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline error
#[derive(Error, Debug)]
pub enum SegmeshError {
    /// Input file could not be opened or read
    #[error("Failed to read input {}: {source}", .path.display())]
    ReadInput {
        /// The input path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written or persisted
    #[error("Failed to write output {}: {source}", .path.display())]
    WriteOutput {
        /// The output path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },

    /// Table serialization failed
    #[error("Serialization failed: {message}")]
    Serialize {
        /// The serializer's message.
        message: String,
    },
}

/// Result type alias for segmesh operations
pub type Result<T> = std::result::Result<T, SegmeshError>;

/// Counters for the recoverable conditions hit during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Record lines that did not match the expected shape
    pub unparseable_lines: usize,
    /// Closed loops with fewer than three vertices
    pub degenerate_contours: usize,
    /// Segments that kept no contour at all
    pub empty_segments: usize,
    /// Segments whose triangle area did not match the polygon area
    pub deviating_segments: usize,
    /// Segments for which earcut returned no triangulation
    pub failed_triangulations: usize,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        *self == Diagnostics::default()
    }
}
