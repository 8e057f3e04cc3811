//! Contour splitting
//!
//! A segment's vertex slice may hold several closed loops back to back: the
//! outer boundary first, then its holes. Each loop ends when the walk returns
//! to the loop's first vertex or the slice runs out.

use crate::draw::geometry::{Contour, ContourKind, Vertex};
use std::ops::Range;
use tracing::debug;

/// Minimum number of vertices for a usable ring
pub const MIN_CONTOUR_VERTICES: usize = 3;

/// Result of splitting one segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContourSplit {
    /// Usable rings in encounter order; the first is the boundary
    pub contours: Vec<Contour>,
    /// Index ranges that were dropped: a leading duplicate vertex and
    /// degenerate loops (with their closing vertex)
    pub discarded: Vec<Range<usize>>,
    /// The first vertex repeated the second and was skipped
    pub leading_duplicate: bool,
}

impl ContourSplit {
    /// Number of degenerate loops dropped, not counting a leading duplicate
    pub fn degenerate_loops(&self) -> usize {
        self.discarded.len() - usize::from(self.leading_duplicate)
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

/// Split a segment's vertices into closed contours
pub fn split_contours(vertices: &[Vertex]) -> ContourSplit {
    let mut split = ContourSplit::default();
    let mut cursor = 0;

    // Some records repeat their first vertex
    if vertices.len() >= 2 && vertices[0] == vertices[1] {
        split.discarded.push(0..1);
        split.leading_duplicate = true;
        cursor = 1;
    }

    while cursor < vertices.len() {
        let first = vertices[cursor];
        let ring_start = cursor;
        let mut end = cursor + 1;
        while end < vertices.len() && vertices[end] != first {
            end += 1;
        }

        let ring = &vertices[ring_start..end];
        // The closing vertex belongs to this loop, not the next one
        let span_end = if end < vertices.len() { end + 1 } else { end };
        let span = ring_start..span_end;

        if ring.len() < MIN_CONTOUR_VERTICES {
            debug!(start = ring_start, len = ring.len(), "dropping degenerate contour");
            split.discarded.push(span.clone());
        } else {
            let kind = if split.contours.is_empty() {
                ContourKind::Boundary
            } else {
                ContourKind::Hole
            };
            split.contours.push(Contour {
                kind,
                vertices: ring.to_vec(),
                span: span.clone(),
            });
        }

        cursor = span.end;
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: u16, y: u16) -> Vertex {
        Vertex::new(x, y)
    }

    /// Every index of the segment is covered exactly once
    fn assert_partition(split: &ContourSplit, len: usize) {
        let mut pieces: Vec<Range<usize>> = split
            .contours
            .iter()
            .map(|c| c.span.clone())
            .chain(split.discarded.iter().cloned())
            .collect();
        pieces.sort_by_key(|r| r.start);
        let mut expected = 0;
        for piece in pieces {
            assert_eq!(piece.start, expected, "gap or overlap at {}", expected);
            assert!(piece.end > piece.start);
            expected = piece.end;
        }
        assert_eq!(expected, len);
    }

    #[test]
    fn test_single_open_ring() {
        let verts = [v(0, 0), v(10, 0), v(10, 10), v(0, 10)];
        let split = split_contours(&verts);
        assert_eq!(split.contours.len(), 1);
        assert_eq!(split.contours[0].kind, ContourKind::Boundary);
        assert_eq!(split.contours[0].vertices, verts.to_vec());
        assert!(split.discarded.is_empty());
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_boundary_and_hole() {
        let verts = [
            v(0, 0), v(10, 0), v(10, 10), v(0, 10), v(0, 0),
            v(2, 3), v(6, 3), v(6, 8), v(2, 8), v(2, 3),
        ];
        let split = split_contours(&verts);
        assert_eq!(split.contours.len(), 2);
        assert_eq!(split.contours[0].kind, ContourKind::Boundary);
        assert_eq!(split.contours[0].span, 0..5);
        assert_eq!(split.contours[0].len(), 4);
        assert_eq!(split.contours[1].kind, ContourKind::Hole);
        assert_eq!(split.contours[1].vertices, vec![v(2, 3), v(6, 3), v(6, 8), v(2, 8)]);
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_hole_closed_by_exhaustion() {
        let verts = [
            v(0, 0), v(10, 0), v(10, 10), v(0, 10), v(0, 0),
            v(2, 3), v(6, 3), v(6, 8),
        ];
        let split = split_contours(&verts);
        assert_eq!(split.contours.len(), 2);
        assert_eq!(split.contours[1].span, 5..8);
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_leading_duplicate_is_dropped() {
        let verts = [v(5, 5), v(5, 5), v(9, 5), v(9, 9), v(5, 9)];
        let split = split_contours(&verts);
        assert_eq!(split.contours.len(), 1);
        assert_eq!(split.contours[0].vertices[0], verts[1]);
        assert_eq!(split.contours[0].span, 1..5);
        assert_eq!(split.discarded, vec![0..1]);
        assert_eq!(split.degenerate_loops(), 0);
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_two_vertex_sliver_yields_nothing() {
        let verts = [v(1, 1), v(4, 4)];
        let split = split_contours(&verts);
        assert!(split.is_empty());
        assert_eq!(split.discarded, vec![0..2]);
        assert_eq!(split.degenerate_loops(), 1);
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_degenerate_loop_between_rings() {
        let verts = [
            v(0, 0), v(10, 0), v(10, 10), v(0, 0),
            v(3, 3), v(4, 4), v(3, 3),
            v(5, 1), v(8, 1), v(8, 4),
        ];
        let split = split_contours(&verts);
        assert_eq!(split.contours.len(), 2);
        assert_eq!(split.discarded, vec![4..7]);
        assert_eq!(split.degenerate_loops(), 1);
        assert_eq!(split.contours[1].kind, ContourKind::Hole);
        assert_partition(&split, verts.len());
    }

    #[test]
    fn test_empty_segment() {
        let split = split_contours(&[]);
        assert!(split.is_empty());
        assert!(split.discarded.is_empty());
    }
}
