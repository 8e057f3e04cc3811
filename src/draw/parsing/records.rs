//! Segment record line parsing
//!
//! A record is an array literal on its own line:
//! `[node_index, pullup, layer, x0, y0, x1, y1, ...],`

use crate::draw::geometry::{LayerIndex, Vertex};
use std::fmt;

/// One accepted record with its coordinates already scaled and offset
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Node index as written in the source, before any remapping
    pub node: u32,
    pub pullup: bool,
    pub layer: LayerIndex,
    pub vertices: Vec<Vertex>,
}

/// Why a line was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    /// Line does not start with `[` (comments, declarations, blank lines)
    NotARecord,
    TooFewFields(usize),
    BadNodeIndex(String),
    /// Node index that does not fit 16 bits once remapped
    NodeOutOfRange(u32),
    BadLayer(String),
    OddCoordinateCount(usize),
    BadCoordinate(String),
    CoordinateOutOfRange(i64),
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRejection::NotARecord => write!(f, "not a record"),
            LineRejection::TooFewFields(n) => write!(f, "expected at least 3 fields, found {}", n),
            LineRejection::BadNodeIndex(s) => write!(f, "bad node index '{}'", s),
            LineRejection::NodeOutOfRange(n) => write!(f, "node index {} outside 0..={}", n, u16::MAX),
            LineRejection::BadLayer(s) => write!(f, "bad layer '{}'", s),
            LineRejection::OddCoordinateCount(n) => write!(f, "odd coordinate count {}", n),
            LineRejection::BadCoordinate(s) => write!(f, "bad coordinate '{}'", s),
            LineRejection::CoordinateOutOfRange(v) => {
                write!(f, "coordinate {} outside 0..={}", v, u16::MAX)
            }
        }
    }
}

/// Apply `floor(raw * scale) + 1`. The offset keeps slightly negative source
/// coordinates (half units in some dies) inside the unsigned range.
pub fn scale_coordinate(raw: f64, scale: f64) -> Result<u16, LineRejection> {
    // `as` saturates, so huge inputs stay huge instead of wrapping
    let value = ((raw * scale).floor() as i64).saturating_add(1);
    u16::try_from(value).map_err(|_| LineRejection::CoordinateOutOfRange(value))
}

/// Parse a single record line
pub fn parse_record_line(line: &str, scale: f64, max_layers: usize) -> Result<RawRecord, LineRejection> {
    if !line.starts_with('[') {
        return Err(LineRejection::NotARecord);
    }

    let body = line
        .trim_start_matches(['[', ' '])
        .trim_end_matches([']', ',', '\n', '\r', ' ', '\t']);
    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();
    if tokens.len() < 3 {
        return Err(LineRejection::TooFewFields(tokens.len()));
    }

    let node = tokens[0]
        .parse::<u32>()
        .map_err(|_| LineRejection::BadNodeIndex(tokens[0].to_string()))?;

    let pullup = tokens[1].trim_matches(|c| c == '\'' || c == '"') == "+";

    let layer = tokens[2]
        .parse::<u8>()
        .ok()
        .filter(|&l| (l as usize) < max_layers)
        .map(LayerIndex)
        .ok_or_else(|| LineRejection::BadLayer(tokens[2].to_string()))?;

    let coords = &tokens[3..];
    if coords.len() % 2 != 0 {
        return Err(LineRejection::OddCoordinateCount(coords.len()));
    }

    let mut vertices = Vec::with_capacity(coords.len() / 2);
    for pair in coords.chunks_exact(2) {
        let x = parse_coordinate(pair[0], scale)?;
        let y = parse_coordinate(pair[1], scale)?;
        vertices.push(Vertex { x, y });
    }

    Ok(RawRecord { node, pullup, layer, vertices })
}

fn parse_coordinate(token: &str, scale: f64) -> Result<u16, LineRejection> {
    let raw = token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LineRejection::BadCoordinate(token.to_string()))?;
    scale_coordinate(raw, scale)
}
