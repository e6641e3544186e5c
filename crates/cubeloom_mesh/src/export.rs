//! Wavefront OBJ export of a committed chunk mesh.
//!
//! Only triangles that draw something are written; every vertex and UV
//! slot is kept so face indices match the chunk buffers one to one.

use std::io::{self, Write};

use crate::sink::ChunkMeshView;

/// Writes `view` as an OBJ document.
///
/// Vertex positions are written in world space (chunk origin added).
///
/// # Errors
///
/// Returns any I/O error from `out`.
pub fn write_obj<W: Write>(view: &ChunkMeshView<'_>, mut out: W) -> io::Result<()> {
    let [ox, oy, oz] = view.origin.map(|c| c as f32);
    writeln!(out, "# cubeloom chunk at {:?}", view.origin)?;
    writeln!(out, "o chunk_{}_{}_{}", view.origin[0], view.origin[1], view.origin[2])?;

    for [x, y, z] in view.positions {
        writeln!(out, "v {} {} {}", x + ox, y + oy, z + oz)?;
    }
    for [u, v] in view.uvs {
        writeln!(out, "vt {u} {v}")?;
    }

    // OBJ indices are 1-based; UVs share the vertex slot.
    for [a, b, c] in view.visible_triangles() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
    }
    out.flush()
}
