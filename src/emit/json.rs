//! JSON and MessagePack serialization
//!
//! JSON carries the large arrays as base64-encoded little-endian bytes so a
//! web front end can wrap them in typed arrays directly. MessagePack stores
//! the tables as plain structured data.

use super::tables::EmittedTables;
use crate::draw::generation::{CellRange, PackedVertex, PickTriangle};
use crate::error::{Result, SegmeshError};
use base64::{engine::general_purpose, Engine as _};
use serde::{Serialize, Serializer};

fn encode_u16s(values: impl Iterator<Item = u16>) -> String {
    let bytes: Vec<u8> = values.flat_map(u16::to_le_bytes).collect();
    general_purpose::STANDARD.encode(bytes)
}

fn encode_u32s(values: impl Iterator<Item = u32>) -> String {
    let bytes: Vec<u8> = values.flat_map(u32::to_le_bytes).collect();
    general_purpose::STANDARD.encode(bytes)
}

/// Serialize packed vertices as a base64 Uint16Array payload
fn serialize_vertices_base64<S>(data: &&[PackedVertex], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode_u16s(data.iter().flatten().copied()))
}

/// Serialize pick pairs as a base64 Uint32Array payload
fn serialize_pairs_base64<S>(data: &&[PickTriangle], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode_u32s(data.iter().flat_map(|t| [t.layer, t.tri_index])))
}

/// Serialize cell ranges as a base64 Uint32Array payload
fn serialize_ranges_base64<S>(data: &&[CellRange], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode_u32s(data.iter().flat_map(|r| [r.start, r.count])))
}

#[derive(Serialize)]
struct LayerJson<'a> {
    layer: u8,
    #[serde(rename = "vertexCount")]
    vertex_count: usize,
    #[serde(rename = "vertexData", serialize_with = "serialize_vertices_base64")]
    vertex_data: &'a [PackedVertex],
}

#[derive(Serialize)]
struct TablesJson<'a> {
    #[serde(rename = "maxX")]
    max_x: u16,
    #[serde(rename = "maxY")]
    max_y: u16,
    #[serde(rename = "minX")]
    min_x: u16,
    #[serde(rename = "minY")]
    min_y: u16,
    #[serde(rename = "gridCells")]
    grid_cells: u32,
    layers: Vec<LayerJson<'a>>,
    #[serde(rename = "pickTriCount")]
    pick_tri_count: usize,
    #[serde(rename = "pickTris", serialize_with = "serialize_pairs_base64")]
    pick_tris: &'a [PickTriangle],
    #[serde(rename = "pickGrid", serialize_with = "serialize_ranges_base64")]
    pick_grid: &'a [CellRange],
}

impl<'a> From<&'a EmittedTables> for TablesJson<'a> {
    fn from(t: &'a EmittedTables) -> Self {
        Self {
            max_x: t.max_x,
            max_y: t.max_y,
            min_x: t.min_x,
            min_y: t.min_y,
            grid_cells: t.grid_cells,
            layers: t
                .layers
                .iter()
                .map(|l| LayerJson {
                    layer: l.layer,
                    vertex_count: l.vertices.len(),
                    vertex_data: &l.vertices,
                })
                .collect(),
            pick_tri_count: t.pick_tris.len(),
            pick_tris: &t.pick_tris,
            pick_grid: &t.pick_grid,
        }
    }
}

pub fn to_json(tables: &EmittedTables) -> Result<Vec<u8>> {
    serde_json::to_vec(&TablesJson::from(tables)).map_err(|e| SegmeshError::Serialize {
        message: e.to_string(),
    })
}

pub fn to_msgpack(tables: &EmittedTables) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(tables).map_err(|e| SegmeshError::Serialize {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::tables::LayerTable;

    fn sample() -> EmittedTables {
        EmittedTables {
            max_x: 10,
            max_y: 10,
            min_x: 1,
            min_y: 1,
            grid_cells: 1,
            layers: vec![LayerTable { layer: 0, vertices: vec![[1, 0, 2, 0]] }],
            pick_tris: vec![PickTriangle { layer: 0, tri_index: 0 }],
            pick_grid: vec![CellRange { start: 0, count: 1 }],
        }
    }

    #[test]
    fn test_json_encodes_arrays_as_base64() {
        let json: serde_json::Value = serde_json::from_slice(&to_json(&sample()).unwrap()).unwrap();
        assert_eq!(json["maxX"], 10);
        assert_eq!(json["gridCells"], 1);
        assert_eq!(json["layers"][0]["vertexCount"], 1);
        // 1, 0, 2, 0 as little-endian u16
        let expected = general_purpose::STANDARD.encode([1u8, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(json["layers"][0]["vertexData"], expected);
        let expected_grid = general_purpose::STANDARD.encode([0u8, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(json["pickGrid"], expected_grid);
    }

    #[test]
    fn test_msgpack_decodes_to_same_tables() {
        let tables = sample();
        let bytes = to_msgpack(&tables).unwrap();
        let decoded: EmittedTables = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, tables);
    }
}
