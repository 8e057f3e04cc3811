//! Computed output tables
//!
//! The grid is a conservative filter: a cell lists every triangle whose
//! bounding box touches it, so consumers must confirm hits with an exact
//! point-in-triangle test.

use crate::draw::generation::{CellRange, GridMapping, LayerVertexBuffer, PackedVertex, PickGrid, PickTriangle};
use crate::draw::geometry::Extents;
use serde::{Deserialize, Serialize};

/// Vertex buffer of one non-empty layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTable {
    pub layer: u8,
    /// `(x, y, node_index, reserved)` per vertex, three per triangle
    pub vertices: Vec<PackedVertex>,
}

impl LayerTable {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Everything handed to the writers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedTables {
    pub max_x: u16,
    pub max_y: u16,
    pub min_x: u16,
    pub min_y: u16,
    /// Picking grid cells along each axis
    pub grid_cells: u32,
    /// Only layers with at least one triangle, in layer order
    pub layers: Vec<LayerTable>,
    pub pick_tris: Vec<PickTriangle>,
    /// Indexed by `cell_y * grid_cells + cell_x`
    pub pick_grid: Vec<CellRange>,
}

impl EmittedTables {
    pub fn from_parts(extents: Option<Extents>, layers: Vec<LayerVertexBuffer>, grid: PickGrid) -> Self {
        let ext = extents.unwrap_or(Extents { min_x: 0, min_y: 0, max_x: 0, max_y: 0 });
        Self {
            max_x: ext.max_x,
            max_y: ext.max_y,
            min_x: ext.min_x,
            min_y: ext.min_y,
            grid_cells: grid.cells,
            layers: layers
                .into_iter()
                .filter(|b| !b.is_empty())
                .map(|b| LayerTable { layer: b.layer.0, vertices: b.vertices })
                .collect(),
            pick_tris: grid.pairs,
            pick_grid: grid.ranges,
        }
    }

    /// Cell mapping the picking grid was built with
    pub fn grid_mapping(&self) -> GridMapping {
        GridMapping::new(self.grid_cells, self.max_x, self.max_y)
    }

    pub fn layer(&self, layer: u8) -> Option<&LayerTable> {
        self.layers.iter().find(|t| t.layer == layer)
    }

    pub fn total_triangles(&self) -> usize {
        self.layers.iter().map(LayerTable::triangle_count).sum()
    }
}
