//! C header/source generation
//!
//! Produces the classic machine-generated `segdefs.h` / `segdefs.c` pair so
//! the tables can be compiled straight into a native viewer.

use super::tables::EmittedTables;
use std::fmt::Write;

/// Header declaring the constants and tables
pub fn render_header(tables: &EmittedTables) -> String {
    let mut s = String::new();
    s.push_str("#pragma once\n");
    s.push_str("// machine generated, don't edit!\n");
    s.push_str("#include <stdint.h>\n");
    // Writing into a String cannot fail
    let _ = writeln!(s, "static const uint16_t seg_max_x = {}; // max x coordinate", tables.max_x);
    let _ = writeln!(s, "static const uint16_t seg_max_y = {}; // max y coordinate", tables.max_y);
    let _ = writeln!(s, "static const uint16_t seg_min_x = {}; // min x coordinate", tables.min_x);
    let _ = writeln!(s, "static const uint16_t seg_min_y = {}; // min y coordinate", tables.min_y);
    let _ = writeln!(
        s,
        "static const uint16_t grid_cells = {}; // length of picking grid in one dimension",
        tables.grid_cells
    );
    for layer in &tables.layers {
        let _ = writeln!(
            s,
            "extern uint16_t seg_vertices_{}[{}]; // (x,y,u=node_index,v=0) as triangle list",
            layer.layer,
            layer.vertices.len() * 4
        );
    }
    let _ = writeln!(
        s,
        "extern uint32_t pick_tris[{}][2]; // (layer,tri_index) pairs for picking check",
        tables.pick_tris.len()
    );
    let _ = writeln!(
        s,
        "extern uint32_t pick_grid[{}][2]; // [y*grid_cells+x](start,num) pairs into pick_tris",
        tables.pick_grid.len()
    );
    s
}

/// Source defining the table contents. `header_name` is the include target.
pub fn render_source(tables: &EmittedTables, header_name: &str) -> String {
    let mut s = String::new();
    s.push_str("// machine generated, don't edit!\n");
    let _ = writeln!(s, "#include \"{}\"", header_name);

    for layer in &tables.layers {
        let _ = writeln!(s, "uint16_t seg_vertices_{}[{}] = {{", layer.layer, layer.vertices.len() * 4);
        for (i, v) in layer.vertices.iter().enumerate() {
            let _ = write!(s, "{},{},{},{},", v[0], v[1], v[2], v[3]);
            if (i + 1) % 8 == 0 {
                s.push('\n');
            }
        }
        s.push_str("};\n");
    }

    let _ = writeln!(s, "uint32_t pick_tris[{}][2] = {{", tables.pick_tris.len());
    for (i, t) in tables.pick_tris.iter().enumerate() {
        let _ = write!(s, "{{{},{}}},", t.layer, t.tri_index);
        if (i + 1) % 16 == 0 {
            s.push('\n');
        }
    }
    s.push_str("};\n");

    let _ = writeln!(s, "uint32_t pick_grid[{}][2] = {{", tables.pick_grid.len());
    for (i, r) in tables.pick_grid.iter().enumerate() {
        let _ = write!(s, "{{{},{}}},", r.start, r.count);
        if (i + 1) % 16 == 0 {
            s.push('\n');
        }
    }
    s.push_str("};\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::generation::{CellRange, PickTriangle};
    use crate::emit::tables::LayerTable;

    fn sample() -> EmittedTables {
        EmittedTables {
            max_x: 8984,
            max_y: 9808,
            min_x: 215,
            min_y: 180,
            grid_cells: 1,
            layers: vec![LayerTable {
                layer: 3,
                vertices: vec![[1, 2, 7, 0], [3, 4, 7, 0], [5, 6, 7, 0]],
            }],
            pick_tris: vec![PickTriangle { layer: 3, tri_index: 0 }],
            pick_grid: vec![CellRange { start: 0, count: 1 }],
        }
    }

    #[test]
    fn test_header_declarations() {
        let h = render_header(&sample());
        assert!(h.contains("static const uint16_t seg_max_x = 8984;"));
        assert!(h.contains("static const uint16_t seg_min_y = 180;"));
        assert!(h.contains("extern uint16_t seg_vertices_3[12];"));
        assert!(h.contains("extern uint32_t pick_tris[1][2];"));
        assert!(h.contains("extern uint32_t pick_grid[1][2];"));
    }

    #[test]
    fn test_source_contents() {
        let c = render_source(&sample(), "segdefs.h");
        assert!(c.contains("#include \"segdefs.h\""));
        assert!(c.contains("uint16_t seg_vertices_3[12] = {\n1,2,7,0,3,4,7,0,5,6,7,0,};"));
        assert!(c.contains("uint32_t pick_tris[1][2] = {\n{3,0},};"));
        assert!(c.contains("uint32_t pick_grid[1][2] = {\n{0,1},};"));
    }
}
