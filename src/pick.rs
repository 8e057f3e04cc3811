//! Point picking over the emitted tables
//!
//! The grid only narrows the search to the triangles whose bounding boxes
//! touch the point's cell; each candidate is then checked with an exact
//! barycentric point-in-triangle test.

use crate::emit::{EmittedTables, LayerTable};
use crate::draw::geometry::NodeIndex;

/// Maximum number of distinct nodes reported by one pick
pub const PICK_MAX_HITS: usize = 16;

/// Which layers take part in picking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMask(Vec<bool>);

impl LayerMask {
    pub fn all(num_layers: usize) -> Self {
        Self(vec![true; num_layers])
    }

    pub fn none(num_layers: usize) -> Self {
        Self(vec![false; num_layers])
    }

    pub fn set(&mut self, layer: usize, enabled: bool) {
        if layer >= self.0.len() {
            self.0.resize(layer + 1, false);
        }
        self.0[layer] = enabled;
    }

    pub fn is_enabled(&self, layer: usize) -> bool {
        self.0.get(layer).copied().unwrap_or(false)
    }
}

impl Default for LayerMask {
    /// Diffusion, polysilicon and metal are pickable; the buried contact,
    /// contact and pad planes are not.
    fn default() -> Self {
        let mut mask = Self::none(6);
        mask.set(0, true);
        mask.set(1, true);
        mask.set(5, true);
        mask
    }
}

/// Distinct nodes under the picked point, in the order they were hit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickResult {
    pub nodes: Vec<NodeIndex>,
}

/// Borrowed view over the tables for repeated queries
#[derive(Debug)]
pub struct PickIndex<'a> {
    tables: &'a EmittedTables,
    /// Layer tables indexed by layer number
    layers: Vec<Option<&'a LayerTable>>,
}

impl<'a> PickIndex<'a> {
    pub fn new(tables: &'a EmittedTables) -> Self {
        let num_layers = tables.layers.iter().map(|l| l.layer as usize + 1).max().unwrap_or(0);
        let mut layers = vec![None; num_layers];
        for table in &tables.layers {
            layers[table.layer as usize] = Some(table);
        }
        Self { tables, layers }
    }

    /// Grid cell containing a point, or `None` outside the coordinate space
    pub fn cell_at(&self, x: f32, y: f32) -> Option<usize> {
        let t = self.tables;
        if t.grid_cells == 0 || x < 0.0 || y < 0.0 || x > t.max_x as f32 || y > t.max_y as f32 {
            return None;
        }
        let mapping = t.grid_mapping();
        let cell = mapping.cell_index(mapping.cell_of_point(x as f64, y as f64));
        (cell < t.pick_grid.len()).then_some(cell)
    }

    /// Nodes whose triangles contain the point `(x, y)` in vertex space
    pub fn pick(&self, x: f32, y: f32, mask: &LayerMask) -> PickResult {
        let mut result = PickResult::default();
        let Some(cell) = self.cell_at(x, y) else {
            return result;
        };

        let range = self.tables.pick_grid[cell];
        let start = range.start as usize;
        let end = start + range.count as usize;
        for entry in self.tables.pick_tris.get(start..end).unwrap_or_default() {
            let layer = entry.layer as usize;
            if !mask.is_enabled(layer) {
                continue;
            }
            let Some(Some(table)) = self.layers.get(layer) else {
                continue;
            };
            let base = entry.tri_index as usize * 3;
            let Some(tri) = table.vertices.get(base..base + 3) else {
                continue;
            };
            let corner = |i: usize| (tri[i][0] as f32, tri[i][1] as f32);
            if !point_in_triangle((x, y), corner(0), corner(1), corner(2)) {
                continue;
            }
            // The node tag is the same on all three corners
            let node = NodeIndex(tri[0][2]);
            if !result.nodes.contains(&node) {
                result.nodes.push(node);
                if result.nodes.len() >= PICK_MAX_HITS {
                    break;
                }
            }
        }
        result
    }
}

/// Barycentric containment test
pub fn point_in_triangle(p: (f32, f32), a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> bool {
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (p.0 - a.0, p.1 - a.1);
    let dot = |u: (f32, f32), w: (f32, f32)| u.0 * w.0 + u.1 * w.1;

    let d00 = dot(v0, v0);
    let d01 = dot(v0, v1);
    let d02 = dot(v0, v2);
    let d11 = dot(v1, v1);
    let d12 = dot(v1, v2);
    let denom = d00 * d11 - d01 * d01;
    if denom == 0.0 {
        return false;
    }
    let inv = 1.0 / denom;
    let u = (d11 * d02 - d01 * d12) * inv;
    let v = (d00 * d12 - d01 * d02) * inv;
    u >= 0.0 && v >= 0.0 && u + v < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::generation::{CellRange, PickGridBuilder, PickTriangle};
    use crate::draw::geometry::{Extents, Vertex};

    /// One right triangle on layer 0 covering the lower-left half of a
    /// 2x2 grid over [0, 100] x [0, 100]
    fn tables() -> EmittedTables {
        let tri = vec![[1, 1, 7, 0], [99, 1, 7, 0], [1, 99, 7, 0]];
        let entry = PickTriangle { layer: 0, tri_index: 0 };
        EmittedTables {
            max_x: 100,
            max_y: 100,
            min_x: 1,
            min_y: 1,
            grid_cells: 2,
            layers: vec![LayerTable { layer: 0, vertices: tri }],
            pick_tris: vec![entry, entry, entry, entry],
            pick_grid: vec![
                CellRange { start: 0, count: 1 },
                CellRange { start: 1, count: 1 },
                CellRange { start: 2, count: 1 },
                CellRange { start: 3, count: 1 },
            ],
        }
    }

    #[test]
    fn test_point_in_triangle() {
        let (a, b, c) = ((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!(point_in_triangle((2.0, 2.0), a, b, c));
        assert!(!point_in_triangle((8.0, 8.0), a, b, c));
        assert!(!point_in_triangle((2.0, 2.0), a, a, a));
    }

    #[test]
    fn test_pick_hits_and_rejects_bbox_only_candidates() {
        let tables = tables();
        let index = PickIndex::new(&tables);
        let mask = LayerMask::default();

        assert_eq!(index.pick(10.0, 10.0, &mask).nodes, vec![NodeIndex(7)]);
        // In cell (1, 1), which lists the triangle, but outside the triangle
        assert!(index.pick(90.0, 90.0, &mask).nodes.is_empty());
    }

    #[test]
    fn test_pick_out_of_bounds_and_masked() {
        let tables = tables();
        let index = PickIndex::new(&tables);
        assert!(index.pick(-5.0, 10.0, &LayerMask::default()).nodes.is_empty());
        assert!(index.pick(10.0, 150.0, &LayerMask::default()).nodes.is_empty());
        assert!(index.pick(10.0, 10.0, &LayerMask::none(6)).nodes.is_empty());
    }

    #[test]
    fn test_cell_at_matches_grid_builder() {
        let tables = tables();
        let index = PickIndex::new(&tables);
        let extents = Extents { min_x: 1, min_y: 1, max_x: 100, max_y: 100 };
        let builder = PickGridBuilder::new(tables.grid_cells, 1, Some(extents));
        let mapping = builder.mapping();

        for y in 0..=100u16 {
            for x in 0..=100u16 {
                let expected = mapping.cell_index(builder.cell_of(Vertex::new(x, y)));
                assert_eq!(index.cell_at(x as f32, y as f32), Some(expected), "point ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_default_mask() {
        let mask = LayerMask::default();
        assert!(mask.is_enabled(0) && mask.is_enabled(1) && mask.is_enabled(5));
        assert!(!mask.is_enabled(2) && !mask.is_enabled(3) && !mask.is_enabled(4));
        assert!(!mask.is_enabled(9));
    }
}
