//! The three shared per-chunk buffers.
//!
//! Sized once from the cell count and never resized. Cells write into
//! their own fixed windows; the renderer reads the whole thing.

/// Vertex slots per cell: 6 faces x 4 corners.
pub const VERTICES_PER_CELL: usize = 24;

/// UV slots per cell, one per vertex.
pub const UVS_PER_CELL: usize = VERTICES_PER_CELL;

/// Index slots per cell: 6 faces x 2 triangles x 3 indices.
pub const INDICES_PER_CELL: usize = 36;

/// Vertex positions, texture coordinates and triangle indices for one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl MeshBuffers {
    /// Allocates zeroed buffers for `cells` cells.
    ///
    /// Note: This allocates memory. Only call during chunk initialization.
    #[must_use]
    pub fn with_cells(cells: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; cells * VERTICES_PER_CELL],
            uvs: vec![[0.0; 2]; cells * UVS_PER_CELL],
            indices: vec![0; cells * INDICES_PER_CELL],
        }
    }

    /// Number of cells these buffers hold.
    ///
    /// # Panics
    ///
    /// Panics if the three buffers disagree with the per-cell strides.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let cells = self.positions.len() / VERTICES_PER_CELL;
        assert!(
            self.positions.len() == cells * VERTICES_PER_CELL
                && self.uvs.len() == cells * UVS_PER_CELL
                && self.indices.len() == cells * INDICES_PER_CELL,
            "mesh buffer stride mismatch: {} positions, {} uvs, {} indices",
            self.positions.len(),
            self.uvs.len(),
            self.indices.len(),
        );
        cells
    }

    /// All vertex positions.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// All texture coordinates.
    #[inline]
    #[must_use]
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// All triangle indices, three per triangle.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub(crate) fn positions_mut(&mut self) -> &mut [[f32; 3]] {
        &mut self.positions
    }

    #[inline]
    pub(crate) fn uvs_mut(&mut self) -> &mut [[f32; 2]] {
        &mut self.uvs
    }

    #[inline]
    pub(crate) fn indices_mut(&mut self) -> &mut [u32] {
        &mut self.indices
    }
}
