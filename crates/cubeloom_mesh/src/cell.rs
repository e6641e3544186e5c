//! # Voxel Cell
//!
//! One lattice cell's view into its chunk's shared buffers.
//!
//! A cell owns nothing but its state and three base offsets. Every
//! write goes through the `&mut MeshBuffers` its chunk lends it, into
//! the window `[base, base + stride)` for each buffer.
//!
//! ## Slot Layout
//!
//! ```text
//! vertices: | back 0..4 | right 4..8 | forward 8..12 | left 12..16 | up 16..20 | down 20..24 |
//! indices:  | back 0..6 | right 6..12 | ...                                      | down 30..36 |
//! ```

use crate::buffers::{MeshBuffers, INDICES_PER_CELL, UVS_PER_CELL, VERTICES_PER_CELL};
use crate::face::{Face, FaceMask};
use crate::texture::{AtlasLayout, VoxelType};

/// Base offsets of one cell's windows in the shared buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSlots {
    /// First vertex slot (also the value of every degenerate index).
    pub vertex: u32,
    /// First UV slot.
    pub uv: usize,
    /// First triangle-index slot.
    pub index: usize,
}

impl CellSlots {
    /// Slots of the `ordinal`-th cell in iteration order.
    ///
    /// # Panics
    ///
    /// Panics if the vertex base does not fit a `u32` index.
    #[must_use]
    pub fn for_ordinal(ordinal: usize) -> Self {
        let vertex = u32::try_from(ordinal * VERTICES_PER_CELL)
            .unwrap_or_else(|_| panic!("cell {ordinal} vertex base overflows u32"));
        Self {
            vertex,
            uv: ordinal * UVS_PER_CELL,
            index: ordinal * INDICES_PER_CELL,
        }
    }
}

/// Geometry, texture and visibility state of one voxel.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelCell {
    slots: CellSlots,
    lattice: [u32; 3],
    half_size: f32,
    on: bool,
    voxel_type: VoxelType,
    /// Faces never drawn, whatever the culling pass decides.
    always_off: FaceMask,
}

impl VoxelCell {
    /// Creates an occupied cell and writes all of its slots.
    #[must_use]
    pub fn new(
        slots: CellSlots,
        lattice: [u32; 3],
        half_size: f32,
        voxel_type: VoxelType,
        buffers: &mut MeshBuffers,
        atlas: &AtlasLayout,
    ) -> Self {
        let cell = Self {
            slots,
            lattice,
            half_size,
            on: true,
            voxel_type,
            always_off: FaceMask::NONE,
        };

        for face in Face::ALL {
            cell.emit_vertices(buffers, face);
            cell.emit_uv(buffers, atlas, face, voxel_type);
            cell.set_face(buffers, face, true);
        }
        cell
    }

    /// True if the cell is occupied.
    #[inline]
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// The cell's voxel type (kept while the cell is off).
    #[inline]
    #[must_use]
    pub const fn voxel_type(&self) -> VoxelType {
        self.voxel_type
    }

    /// The cell's buffer windows.
    #[inline]
    #[must_use]
    pub const fn slots(&self) -> CellSlots {
        self.slots
    }

    /// Chunk-local lattice coordinate.
    #[inline]
    #[must_use]
    pub const fn lattice(&self) -> [u32; 3] {
        self.lattice
    }

    /// Faces permanently suppressed on this cell.
    #[inline]
    #[must_use]
    pub const fn always_off(&self) -> FaceMask {
        self.always_off
    }

    /// Writes the 4 corner positions of `face`.
    pub fn emit_vertices(&self, buffers: &mut MeshBuffers, face: Face) {
        let center = self.lattice.map(|c| c as f32);
        let start = self.slots.vertex as usize + face.index() * 4;
        let out = &mut buffers.positions_mut()[start..start + 4];

        for (slot, corner) in out.iter_mut().zip(face.corners()) {
            let signs = corner.signs();
            *slot = [
                center[0] + signs[0] * self.half_size,
                center[1] + signs[1] * self.half_size,
                center[2] + signs[2] * self.half_size,
            ];
        }
    }

    /// Writes the 4 UVs of `face` for `voxel_type`'s tile.
    pub fn emit_uv(&self, buffers: &mut MeshBuffers, atlas: &AtlasLayout, face: Face, voxel_type: VoxelType) {
        let rect = atlas.uv_rect(voxel_type.tiles().for_face(face));
        let start = self.slots.uv + face.index() * 4;
        buffers.uvs_mut()[start..start + 4].copy_from_slice(&rect.corners_for(face));
    }

    /// Writes the 6 indices of `face`.
    ///
    /// A disabled face, or one in the always-off mask, collapses all 6
    /// indices onto the cell's first vertex slot.
    pub fn set_face(&self, buffers: &mut MeshBuffers, face: Face, enabled: bool) {
        let start = self.slots.index + face.index() * 6;
        let out = &mut buffers.indices_mut()[start..start + 6];

        if !enabled || self.always_off.contains(face) {
            out.fill(self.slots.vertex);
            return;
        }

        let face_base = self.slots.vertex + face.index() as u32 * 4;
        for (slot, local) in out.iter_mut().zip(face.fan()) {
            *slot = face_base + local;
        }
    }

    /// True if `face` currently draws two real triangles.
    #[must_use]
    pub fn face_visible(&self, buffers: &MeshBuffers, face: Face) -> bool {
        let start = self.slots.index + face.index() * 6;
        let tris = &buffers.indices()[start..start + 6];
        tris.iter().any(|i| *i != tris[0])
    }

    /// Occupies the cell as `voxel_type` and shows all faces.
    pub fn turn_on(&mut self, buffers: &mut MeshBuffers, atlas: &AtlasLayout, voxel_type: VoxelType) {
        self.on = true;
        self.voxel_type = voxel_type;
        for face in Face::ALL {
            self.emit_uv(buffers, atlas, face, voxel_type);
            self.set_face(buffers, face, true);
        }
    }

    /// Empties the cell and degenerates all of its triangles.
    pub fn turn_off(&mut self, buffers: &mut MeshBuffers) {
        self.on = false;
        for face in Face::ALL {
            self.set_face(buffers, face, false);
        }
    }

    /// Adds `mask` to the always-off faces and hides them now.
    pub fn disable_faces(&mut self, buffers: &mut MeshBuffers, mask: FaceMask) {
        self.always_off |= mask;
        for face in mask.iter() {
            self.set_face(buffers, face, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_cell(voxel_type: VoxelType) -> (VoxelCell, MeshBuffers, AtlasLayout) {
        let atlas = AtlasLayout::default();
        let mut buffers = MeshBuffers::with_cells(2);
        // Second slot so degenerate indices are distinguishable from 0.
        let cell = VoxelCell::new(CellSlots::for_ordinal(1), [2, 3, 4], 0.5, voxel_type, &mut buffers, &atlas);
        (cell, buffers, atlas)
    }

    #[test]
    fn test_slots_are_stride_multiples() {
        let slots = CellSlots::for_ordinal(3);
        assert_eq!(slots, CellSlots { vertex: 72, uv: 72, index: 108 });
    }

    #[test]
    fn test_back_face_geometry() {
        let (_, buffers, _) = single_cell(VoxelType::Dirt);
        let back = &buffers.positions()[24..28];
        // E F A B around lattice (2, 3, 4).
        assert_eq!(back[0], [1.5, 3.5, 3.5]);
        assert_eq!(back[1], [2.5, 3.5, 3.5]);
        assert_eq!(back[2], [1.5, 2.5, 3.5]);
        assert_eq!(back[3], [2.5, 2.5, 3.5]);
    }

    #[test]
    fn test_enabled_face_indices() {
        let (_, buffers, _) = single_cell(VoxelType::Dirt);
        let back = &buffers.indices()[36..42];
        assert_eq!(back, &[26, 24, 25, 27, 26, 25]);
        let up = &buffers.indices()[36 + 24..36 + 30];
        assert_eq!(up, &[40, 42, 43, 41, 40, 43]);
    }

    #[test]
    fn test_disabled_face_collapses_to_own_base() {
        let (cell, mut buffers, _) = single_cell(VoxelType::Dirt);
        cell.set_face(&mut buffers, Face::Left, false);
        let left = &buffers.indices()[36 + 18..36 + 24];
        assert_eq!(left, &[24; 6]);
        assert!(!cell.face_visible(&buffers, Face::Left));
        assert!(cell.face_visible(&buffers, Face::Right));
    }

    #[test]
    fn test_turn_off_then_on() {
        let (mut cell, mut buffers, atlas) = single_cell(VoxelType::Stone);
        let fresh = buffers.clone();

        cell.turn_off(&mut buffers);
        assert!(!cell.is_on());
        assert!(Face::ALL.iter().all(|f| !cell.face_visible(&buffers, *f)));

        cell.turn_on(&mut buffers, &atlas, VoxelType::Stone);
        assert!(cell.is_on());
        assert_eq!(buffers, fresh);
    }

    #[test]
    fn test_retype_rewrites_uvs() {
        let (mut cell, mut buffers, atlas) = single_cell(VoxelType::Grass);
        let top_before = buffers.uvs()[24 + 16];
        cell.turn_on(&mut buffers, &atlas, VoxelType::Sand);
        assert_eq!(cell.voxel_type(), VoxelType::Sand);
        assert_ne!(buffers.uvs()[24 + 16], top_before);
    }

    #[test]
    fn test_always_off_mask_wins_over_enable() {
        let (mut cell, mut buffers, atlas) = single_cell(VoxelType::Dirt);
        cell.disable_faces(&mut buffers, Face::Down.bit());

        cell.turn_on(&mut buffers, &atlas, VoxelType::Dirt);
        assert!(!cell.face_visible(&buffers, Face::Down));
        assert!(cell.face_visible(&buffers, Face::Up));
        assert!(cell.always_off().contains(Face::Down));
    }
}
