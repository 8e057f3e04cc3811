//! Binary serialization of the output tables
//!
//! Format (little endian, every section 4-byte aligned):
//! - Header: "SEGMESH1" (8 bytes magic)
//! - Constants: max_x, max_y, min_x, min_y (u16 each), grid_cells (u32)
//! - Layers: [num_layers: u32] then per layer
//!   [layer: u32][vertex_count: u32][vertex_data: 4 x u16 per vertex]
//!   padded to 4 bytes
//! - Pick triangles: [count: u32] then (layer: u32, tri_index: u32) pairs
//! - Pick grid: [count: u32] then (start: u32, count: u32) pairs

use super::tables::{EmittedTables, LayerTable};
use crate::draw::generation::{CellRange, PickTriangle};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

pub const MAGIC: &[u8; 8] = b"SEGMESH1";

/// Write the tables in binary form
pub fn write_binary<W: Write>(tables: &EmittedTables, out: &mut W) -> io::Result<()> {
    out.write_all(MAGIC)?;

    out.write_u16::<LittleEndian>(tables.max_x)?;
    out.write_u16::<LittleEndian>(tables.max_y)?;
    out.write_u16::<LittleEndian>(tables.min_x)?;
    out.write_u16::<LittleEndian>(tables.min_y)?;
    out.write_u32::<LittleEndian>(tables.grid_cells)?;

    out.write_u32::<LittleEndian>(tables.layers.len() as u32)?;
    for layer in &tables.layers {
        out.write_u32::<LittleEndian>(layer.layer as u32)?;
        out.write_u32::<LittleEndian>(layer.vertices.len() as u32)?;
        for v in &layer.vertices {
            for &c in v {
                out.write_u16::<LittleEndian>(c)?;
            }
        }
        // Each vertex is 8 bytes, so the section is already aligned
    }

    out.write_u32::<LittleEndian>(tables.pick_tris.len() as u32)?;
    for t in &tables.pick_tris {
        out.write_u32::<LittleEndian>(t.layer)?;
        out.write_u32::<LittleEndian>(t.tri_index)?;
    }

    out.write_u32::<LittleEndian>(tables.pick_grid.len() as u32)?;
    for r in &tables.pick_grid {
        out.write_u32::<LittleEndian>(r.start)?;
        out.write_u32::<LittleEndian>(r.count)?;
    }

    Ok(())
}

/// Serialize to an in-memory buffer
pub fn to_bytes(tables: &EmittedTables) -> Vec<u8> {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_binary(tables, &mut buffer);
    buffer
}

/// Read tables written by [`write_binary`]
pub fn read_binary<R: Read>(input: &mut R) -> io::Result<EmittedTables> {
    let mut magic = [0u8; 8];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad magic, not a segmesh table file"));
    }

    let max_x = input.read_u16::<LittleEndian>()?;
    let max_y = input.read_u16::<LittleEndian>()?;
    let min_x = input.read_u16::<LittleEndian>()?;
    let min_y = input.read_u16::<LittleEndian>()?;
    let grid_cells = input.read_u32::<LittleEndian>()?;

    let num_layers = input.read_u32::<LittleEndian>()?;
    let mut layers = Vec::with_capacity(num_layers as usize);
    for _ in 0..num_layers {
        let layer = input.read_u32::<LittleEndian>()?;
        let layer = u8::try_from(layer)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "layer index out of range"))?;
        let count = input.read_u32::<LittleEndian>()? as usize;
        let mut vertices = Vec::with_capacity(count);
        for _ in 0..count {
            let mut v = [0u16; 4];
            input.read_u16_into::<LittleEndian>(&mut v)?;
            vertices.push(v);
        }
        layers.push(LayerTable { layer, vertices });
    }

    let num_tris = input.read_u32::<LittleEndian>()? as usize;
    let mut pick_tris = Vec::with_capacity(num_tris);
    for _ in 0..num_tris {
        let layer = input.read_u32::<LittleEndian>()?;
        let tri_index = input.read_u32::<LittleEndian>()?;
        pick_tris.push(PickTriangle { layer, tri_index });
    }

    let num_cells = input.read_u32::<LittleEndian>()? as usize;
    let mut pick_grid = Vec::with_capacity(num_cells);
    for _ in 0..num_cells {
        let start = input.read_u32::<LittleEndian>()?;
        let count = input.read_u32::<LittleEndian>()?;
        pick_grid.push(CellRange { start, count });
    }

    Ok(EmittedTables { max_x, max_y, min_x, min_y, grid_cells, layers, pick_tris, pick_grid })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmittedTables {
        EmittedTables {
            max_x: 300,
            max_y: 200,
            min_x: 3,
            min_y: 4,
            grid_cells: 2,
            layers: vec![LayerTable {
                layer: 5,
                vertices: vec![[3, 4, 9, 0], [30, 4, 9, 0], [3, 40, 9, 0]],
            }],
            pick_tris: vec![PickTriangle { layer: 5, tri_index: 0 }],
            pick_grid: vec![
                CellRange { start: 0, count: 1 },
                CellRange { start: 1, count: 0 },
                CellRange { start: 1, count: 0 },
                CellRange { start: 1, count: 0 },
            ],
        }
    }

    #[test]
    fn test_binary_layout() {
        let bytes = to_bytes(&sample());
        assert_eq!(&bytes[..8], MAGIC);
        // max_x
        assert_eq!(&bytes[8..10], &300u16.to_le_bytes());
        // 8 magic + 12 constants + 4 + (8 + 24) layer + (4 + 8) tris + (4 + 32) grid
        assert_eq!(bytes.len(), 8 + 12 + 4 + 32 + 12 + 36);
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_read_back() {
        let tables = sample();
        let bytes = to_bytes(&tables);
        let decoded = read_binary(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded, tables);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = to_bytes(&sample());
        bytes[0] = b'X';
        assert!(read_binary(&mut bytes.as_slice()).is_err());
    }
}
