//! Chunk configuration, set once before a chunk is built.

use serde::Deserialize;

use crate::buffers::VERTICES_PER_CELL;
use crate::error::{MeshError, MeshResult};
use crate::texture::{AtlasLayout, VoxelType};

/// Smallest supported voxel half-size.
pub const MIN_VOXEL_HALF_SIZE: f32 = 0.25;

/// Largest supported voxel half-size (cubes touch their neighbors).
pub const MAX_VOXEL_HALF_SIZE: f32 = 0.5;

/// Per-chunk settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Cells along x, y and z.
    pub extent: [u32; 3],
    /// Half the edge length of a voxel cube.
    pub voxel_half_size: f32,
    /// Hide faces shared by two occupied cells on every commit.
    pub culling: bool,
    /// Type every cell starts with.
    pub default_type: VoxelType,
    /// Texture atlas shape.
    pub atlas: AtlasLayout,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            extent: [10, 10, 10],
            voxel_half_size: MAX_VOXEL_HALF_SIZE,
            culling: true,
            default_type: VoxelType::Grass,
            atlas: AtlasLayout::default(),
        }
    }
}

impl ChunkConfig {
    /// Config with the given extent and defaults for everything else.
    #[must_use]
    pub fn with_extent(extent: [u32; 3]) -> Self {
        Self { extent, ..Self::default() }
    }

    /// Number of cells in one chunk.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.extent.iter().map(|e| *e as usize).product()
    }

    /// Rejects configurations no chunk can be built from.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidExtent`] if any extent is zero
    /// - [`MeshError::VoxelSizeOutOfRange`] if the half-size is outside
    ///   `[0.25, 0.5]` or not finite
    /// - [`MeshError::ChunkTooLarge`] if vertex slots overflow `u32`
    /// - [`MeshError::AtlasTooSmall`] or [`MeshError::AtlasTooLarge`]
    ///   from the atlas check
    pub fn validate(&self) -> MeshResult<()> {
        if self.extent.contains(&0) {
            return Err(MeshError::InvalidExtent(self.extent));
        }

        if !(MIN_VOXEL_HALF_SIZE..=MAX_VOXEL_HALF_SIZE).contains(&self.voxel_half_size) {
            return Err(MeshError::VoxelSizeOutOfRange(self.voxel_half_size));
        }

        let cells: u64 = self.extent.iter().map(|e| u64::from(*e)).product();
        let vertices = cells * VERTICES_PER_CELL as u64;
        if vertices > u64::from(u32::MAX) {
            return Err(MeshError::ChunkTooLarge { cells, vertices });
        }

        self.atlas.validate()
    }
}
