//! Polygon triangulation using earcut
//!
//! The boundary and its holes are flattened into one coordinate buffer with
//! hole start offsets, triangulated in one pass, and the result is checked
//! against the polygon area.

use crate::draw::geometry::{ring_doubled_area, Contour, NodeIndex, Triangle, Vertex};

/// Area comparison between a polygon-with-holes and its triangulation.
/// Both values are doubled areas so integer input stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaCheck {
    /// `|A(boundary)| - sum |A(hole)|`
    pub expected: i64,
    /// `sum |A(triangle)|`
    pub actual: i64,
}

impl AreaCheck {
    pub fn is_exact(&self) -> bool {
        self.expected == self.actual
    }

    /// Relative error of the triangulated area, zero when both areas are zero
    pub fn deviation(&self) -> f64 {
        let diff = (self.actual - self.expected).abs() as f64;
        if self.expected == 0 {
            if diff == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            diff / self.expected.abs() as f64
        }
    }
}

/// Triangles for one segment plus the area check
#[derive(Debug, Clone, Default)]
pub struct Tessellation {
    pub triangles: Vec<Triangle>,
    pub check: AreaCheck,
    /// Earcut returned no triangulation for a non-empty input
    pub failed: bool,
}

/// Triangulate a boundary with optional holes. `contours[0]` is the boundary.
/// Every triangle is tagged with `node`.
pub fn triangulate_contours(contours: &[Contour], node: NodeIndex) -> Tessellation {
    let Some((boundary, holes)) = contours.split_first() else {
        return Tessellation::default();
    };

    // Build flat coordinate array for earcut
    let total: usize = contours.iter().map(Contour::len).sum();
    let mut points: Vec<Vertex> = Vec::with_capacity(total);
    let mut flat_coords: Vec<f64> = Vec::with_capacity(total * 2);
    let mut hole_indices: Vec<usize> = Vec::with_capacity(holes.len());

    for p in &boundary.vertices {
        points.push(*p);
        flat_coords.push(p.x as f64);
        flat_coords.push(p.y as f64);
    }
    for hole in holes {
        hole_indices.push(points.len());
        for p in &hole.vertices {
            points.push(*p);
            flat_coords.push(p.x as f64);
            flat_coords.push(p.y as f64);
        }
    }

    let indices = earcutr::earcut(&flat_coords, &hole_indices, 2).unwrap_or_default();

    let triangles: Vec<Triangle> = indices
        .chunks_exact(3)
        .map(|tri| Triangle {
            vertices: [points[tri[0]], points[tri[1]], points[tri[2]]],
            node,
        })
        .collect();

    let expected = ring_doubled_area(&boundary.vertices)
        - holes.iter().map(|h| ring_doubled_area(&h.vertices)).sum::<i64>();
    let actual = triangles.iter().map(Triangle::doubled_area).sum();

    Tessellation {
        failed: triangles.is_empty() && expected != 0,
        triangles,
        check: AreaCheck { expected, actual },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::ContourKind;

    fn ring(kind: ContourKind, pts: &[(u16, u16)]) -> Contour {
        Contour {
            kind,
            vertices: pts.iter().map(|&(x, y)| Vertex::new(x, y)).collect(),
            span: 0..pts.len(),
        }
    }

    #[test]
    fn test_rectangle() {
        let contours = [ring(ContourKind::Boundary, &[(0, 0), (10, 0), (10, 10), (0, 10)])];
        let tess = triangulate_contours(&contours, NodeIndex(3));
        assert_eq!(tess.triangles.len(), 2);
        assert!(tess.triangles.iter().all(|t| t.node == NodeIndex(3)));
        assert_eq!(tess.check.expected, 200);
        assert!(tess.check.is_exact());
        assert_eq!(tess.check.deviation(), 0.0);
        assert!(!tess.failed);
    }

    #[test]
    fn test_rectangle_with_hole() {
        let contours = [
            ring(ContourKind::Boundary, &[(0, 0), (10, 0), (10, 10), (0, 10)]),
            ring(ContourKind::Hole, &[(2, 3), (6, 3), (6, 8), (2, 8)]),
        ];
        let tess = triangulate_contours(&contours, NodeIndex(1));
        assert_eq!(tess.triangles.len(), 8);
        // 100 - 20, doubled
        assert_eq!(tess.check.expected, 160);
        assert_eq!(tess.check.actual, 160);
        assert_eq!(tess.check.deviation(), 0.0);
    }

    #[test]
    fn test_concave_polygon() {
        // L shape
        let contours = [ring(
            ContourKind::Boundary,
            &[(0, 0), (6, 0), (6, 2), (2, 2), (2, 6), (0, 6)],
        )];
        let tess = triangulate_contours(&contours, NodeIndex(9));
        assert_eq!(tess.triangles.len(), 4);
        assert!(tess.check.is_exact());
    }

    #[test]
    fn test_no_contours() {
        let tess = triangulate_contours(&[], NodeIndex(0));
        assert!(tess.triangles.is_empty());
        assert!(!tess.failed);
    }

    #[test]
    fn test_deviation_is_relative() {
        let check = AreaCheck { expected: 100, actual: 90 };
        assert!(!check.is_exact());
        assert!((check.deviation() - 0.1).abs() < 1e-12);
        assert_eq!(AreaCheck::default().deviation(), 0.0);
    }
}
