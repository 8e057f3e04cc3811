//! Per-layer triangle list vertex buffers

use crate::draw::geometry::{LayerIndex, Triangle};

/// Vertex quadruple as uploaded to the GPU: x, y, node index, reserved
pub type PackedVertex = [u16; 4];

/// Triangle list for one layer. Three packed vertices per triangle; the
/// position of a triangle in the list is its picking index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerVertexBuffer {
    pub layer: LayerIndex,
    pub vertices: Vec<PackedVertex>,
}

impl LayerVertexBuffer {
    pub fn with_capacity(layer: LayerIndex, vertices: usize) -> Self {
        Self {
            layer,
            vertices: Vec::with_capacity(vertices),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a triangle and return its index in this layer
    pub fn push_triangle(&mut self, triangle: &Triangle) -> u32 {
        let index = self.triangle_count() as u32;
        for v in &triangle.vertices {
            self.vertices.push([v.x, v.y, triangle.node.0, 0]);
        }
        index
    }

    /// Corner positions of triangle `index`
    pub fn triangle_corners(&self, index: usize) -> Option<[(u16, u16); 3]> {
        let base = index * 3;
        let tri = self.vertices.get(base..base + 3)?;
        Some([
            (tri[0][0], tri[0][1]),
            (tri[1][0], tri[1][1]),
            (tri[2][0], tri[2][1]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::geometry::{NodeIndex, Vertex};

    #[test]
    fn test_push_assigns_sequential_indices() {
        let mut buf = LayerVertexBuffer::with_capacity(LayerIndex(2), 6);
        let tri = Triangle {
            vertices: [Vertex::new(1, 2), Vertex::new(3, 4), Vertex::new(5, 6)],
            node: NodeIndex(42),
        };
        assert_eq!(buf.push_triangle(&tri), 0);
        assert_eq!(buf.push_triangle(&tri), 1);
        assert_eq!(buf.triangle_count(), 2);
        assert_eq!(buf.vertices[4], [3, 4, 42, 0]);
        assert_eq!(buf.triangle_corners(1), Some([(1, 2), (3, 4), (5, 6)]));
        assert_eq!(buf.triangle_corners(2), None);
    }
}
