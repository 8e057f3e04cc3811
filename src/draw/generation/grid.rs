//! Picking grid construction
//!
//! Every triangle is bucketed into the cells of an N x N grid spanning
//! `[0, MAX_X] x [0, MAX_Y]`, one grid per layer. A triangle lands in every
//! cell its vertex bounding box touches, endpoints included. This is a coarse
//! filter: cells the box covers but the triangle does not are still tagged,
//! and callers are expected to run an exact point-in-triangle test on the
//! candidates (see `crate::pick`).

use crate::draw::geometry::{Extents, LayerIndex, Triangle, Vertex};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Reference from a grid cell to one triangle of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickTriangle {
    pub layer: u32,
    pub tri_index: u32,
}

/// Range of a cell's entries in the flattened pair table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: u32,
    pub count: u32,
}

/// Flattened picking grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickGrid {
    /// Cells along each axis
    pub cells: u32,
    /// `(layer, triangle)` pairs ordered by cell, then layer, then insertion
    pub pairs: Vec<PickTriangle>,
    /// One range per cell, indexed by `cell_y * cells + cell_x`
    pub ranges: Vec<CellRange>,
}

impl PickGrid {
    pub fn cell_entries(&self, cell_x: u32, cell_y: u32) -> &[PickTriangle] {
        let range = self.ranges[cell_y as usize * self.cells as usize + cell_x as usize];
        let start = range.start as usize;
        &self.pairs[start..start + range.count as usize]
    }

    pub fn stats(&self) -> GridStats {
        let num_cells = self.ranges.len();
        let empty_cells = self.ranges.iter().filter(|r| r.count == 0).count();
        let max_entries = self.ranges.iter().map(|r| r.count).max().unwrap_or(0);
        let mean_entries = if num_cells == 0 {
            0.0
        } else {
            self.pairs.len() as f64 / num_cells as f64
        };
        GridStats { empty_cells, max_entries, mean_entries }
    }
}

/// Occupancy summary of a finished grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridStats {
    pub empty_cells: usize,
    pub max_entries: u32,
    pub mean_entries: f64,
}

/// Vertex-space to grid-cell mapping shared by the builder and the picker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    cells: u32,
    mul_x: f64,
    mul_y: f64,
}

impl GridMapping {
    pub fn new(cells: u32, max_x: u16, max_y: u16) -> Self {
        Self {
            cells,
            mul_x: cells as f64 / max_x.max(1) as f64,
            mul_y: cells as f64 / max_y.max(1) as f64,
        }
    }

    pub fn cells(&self) -> u32 {
        self.cells
    }

    /// Grid cell of a point. Points on MAX_X or MAX_Y map to the last cell,
    /// negative coordinates to the first.
    pub fn cell_of_point(&self, x: f64, y: f64) -> (u32, u32) {
        let last = self.cells.saturating_sub(1);
        let cx = ((x * self.mul_x) as u32).min(last);
        let cy = ((y * self.mul_y) as u32).min(last);
        (cx, cy)
    }

    pub fn cell_of(&self, v: Vertex) -> (u32, u32) {
        self.cell_of_point(v.x as f64, v.y as f64)
    }

    /// Flattened `cell_y * cells + cell_x`
    pub fn cell_index(&self, (cell_x, cell_y): (u32, u32)) -> usize {
        cell_y as usize * self.cells as usize + cell_x as usize
    }

    pub fn cells_per_layer(&self) -> usize {
        self.cells as usize * self.cells as usize
    }
}

/// Accumulates per-layer, per-cell triangle stacks
#[derive(Debug, Clone)]
pub struct PickGridBuilder {
    mapping: GridMapping,
    num_layers: usize,
    /// Indexed by `layer * cells * cells + cell`
    stacks: Vec<Vec<u32>>,
}

impl PickGridBuilder {
    pub fn new(cells: u32, num_layers: usize, extents: Option<Extents>) -> Self {
        let (max_x, max_y) = extents.map(|e| (e.max_x, e.max_y)).unwrap_or((0, 0));
        let mapping = GridMapping::new(cells, max_x, max_y);
        Self {
            mapping,
            num_layers,
            stacks: vec![Vec::new(); num_layers * mapping.cells_per_layer()],
        }
    }

    pub fn mapping(&self) -> GridMapping {
        self.mapping
    }

    /// Grid cell of a vertex. A vertex on MAX_X or MAX_Y maps to the last cell.
    pub fn cell_of(&self, v: Vertex) -> (u32, u32) {
        self.mapping.cell_of(v)
    }

    /// Tag every cell overlapped by the triangle's bounding box
    pub fn insert_triangle(&mut self, layer: LayerIndex, tri_index: u32, triangle: &Triangle) {
        let [c0, c1, c2] = triangle.vertices.map(|v| self.cell_of(v));
        let min_x = c0.0.min(c1.0).min(c2.0);
        let min_y = c0.1.min(c1.1).min(c2.1);
        let max_x = c0.0.max(c1.0).max(c2.0);
        let max_y = c0.1.max(c1.1).max(c2.1);

        let layer_base = layer.as_usize() * self.mapping.cells_per_layer();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let cell = self.mapping.cell_index((x, y));
                self.stacks[layer_base + cell].push(tri_index);
            }
        }
    }

    /// Flatten the stacks into the pair table and per-cell ranges
    pub fn finish(self) -> PickGrid {
        let cells_per_layer = self.mapping.cells_per_layer();
        let total: usize = self.stacks.iter().map(Vec::len).sum();
        let mut pairs = Vec::with_capacity(total);
        let mut ranges = Vec::with_capacity(cells_per_layer);

        for cell in 0..cells_per_layer {
            let start = pairs.len();
            for layer in 0..self.num_layers {
                for &tri_index in &self.stacks[layer * cells_per_layer + cell] {
                    pairs.push(PickTriangle { layer: layer as u32, tri_index });
                }
            }
            ranges.push(CellRange {
                start: start as u32,
                count: (pairs.len() - start) as u32,
            });
        }

        let grid = PickGrid { cells: self.mapping.cells(), pairs, ranges };
        let stats = grid.stats();
        info!(
            pairs = grid.pairs.len(),
            empty_cells = stats.empty_cells,
            max_per_cell = stats.max_entries,
            mean_per_cell = stats.mean_entries,
            "flattened picking grid"
        );
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::NodeIndex;

    fn tri(pts: [(u16, u16); 3]) -> Triangle {
        Triangle {
            vertices: pts.map(|(x, y)| Vertex::new(x, y)),
            node: NodeIndex(0),
        }
    }

    fn extents(max_x: u16, max_y: u16) -> Option<Extents> {
        Some(Extents { min_x: 0, min_y: 0, max_x, max_y })
    }

    #[test]
    fn test_cell_of_clamps_max_edge() {
        let builder = PickGridBuilder::new(4, 1, extents(100, 200));
        assert_eq!(builder.cell_of(Vertex::new(0, 0)), (0, 0));
        assert_eq!(builder.cell_of(Vertex::new(24, 49)), (0, 0));
        assert_eq!(builder.cell_of(Vertex::new(26, 51)), (1, 1));
        assert_eq!(builder.cell_of(Vertex::new(100, 200)), (3, 3));
    }

    #[test]
    fn test_bbox_is_inclusive() {
        let mut builder = PickGridBuilder::new(4, 2, extents(100, 100));
        // spans cells x 0..=2, y 0..=1
        builder.insert_triangle(LayerIndex(1), 7, &tri([(10, 10), (60, 10), (10, 30)]));
        let grid = builder.finish();

        assert_eq!(grid.ranges.len(), 16);
        assert_eq!(grid.pairs.len(), 6);
        for y in 0..4 {
            for x in 0..4 {
                let entries = grid.cell_entries(x, y);
                if x <= 2 && y <= 1 {
                    assert_eq!(entries, &[PickTriangle { layer: 1, tri_index: 7 }]);
                } else {
                    assert!(entries.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_flatten_orders_by_cell_then_layer() {
        let mut builder = PickGridBuilder::new(2, 3, extents(10, 10));
        let small = tri([(1, 1), (2, 1), (1, 2)]);
        builder.insert_triangle(LayerIndex(2), 0, &small);
        builder.insert_triangle(LayerIndex(0), 4, &small);
        builder.insert_triangle(LayerIndex(2), 1, &small);
        builder.insert_triangle(LayerIndex(0), 5, &tri([(6, 6), (9, 6), (6, 9)]));
        let grid = builder.finish();

        assert_eq!(
            grid.cell_entries(0, 0),
            &[
                PickTriangle { layer: 0, tri_index: 4 },
                PickTriangle { layer: 2, tri_index: 0 },
                PickTriangle { layer: 2, tri_index: 1 },
            ]
        );
        assert_eq!(grid.ranges[3], CellRange { start: 3, count: 1 });
        assert_eq!(grid.ranges[1], CellRange { start: 3, count: 0 });

        let stats = grid.stats();
        assert_eq!(stats.empty_cells, 2);
        assert_eq!(stats.max_entries, 3);
        assert!((stats.mean_entries - 1.0).abs() < 1e-12);
    }
}
