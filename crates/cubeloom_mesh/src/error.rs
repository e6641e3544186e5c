//! # Mesh Error Types
//!
//! Two families: configuration errors, rejected before any chunk is
//! built, and edit errors, which are recovered locally by the chunk.

use thiserror::Error;

/// Configuration rejected at chunk construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A chunk extent was zero.
    #[error("chunk extent must be at least 1 on every axis, got {0:?}")]
    InvalidExtent([u32; 3]),

    /// Voxel half-size outside the supported range.
    #[error("voxel half-size {0} outside [{min}, {max}]", min = crate::config::MIN_VOXEL_HALF_SIZE, max = crate::config::MAX_VOXEL_HALF_SIZE)]
    VoxelSizeOutOfRange(f32),

    /// The chunk has more vertices than a `u32` index can address.
    #[error("chunk of {cells} cells needs {vertices} vertices, exceeding u32 indices")]
    ChunkTooLarge {
        /// Cell count.
        cells: u64,
        /// Vertex count the cells would need.
        vertices: u64,
    },

    /// The texture atlas cannot hold the 4x4 tile set.
    #[error("texture atlas {columns}x{rows} too small, need at least 4x4 non-empty tiles")]
    AtlasTooSmall {
        /// Atlas columns.
        columns: u32,
        /// Atlas rows.
        rows: u32,
    },

    /// The atlas pixel size does not fit in `u32` on one axis.
    #[error("texture atlas of {tiles} tiles x {tile_px} px overflows u32 on {axis}")]
    AtlasTooLarge {
        /// `"width"` or `"height"`.
        axis: &'static str,
        /// Tiles along that axis.
        tiles: u32,
        /// Tile size in pixels along that axis.
        tile_px: u32,
    },
}

/// Why an interactive edit was skipped.
///
/// The chunk still commits after a skipped edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The probed lattice cell lies outside the chunk.
    #[error("lattice cell {lattice:?} outside chunk extent {extent:?}")]
    OutOfBounds {
        /// Chunk-local lattice coordinate of the probe.
        lattice: [i64; 3],
        /// Chunk extent.
        extent: [u32; 3],
    },

    /// The cell is already in the requested state.
    #[error("cell {cell:?} already in requested state")]
    AlreadyInState {
        /// Chunk-local cell coordinate.
        cell: [usize; 3],
    },

    /// The hit point or normal was NaN or infinite.
    #[error("hit data is not finite")]
    NonFiniteHit,
}

/// Result type for chunk construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// Result type for interactive edits.
pub type EditResult<T> = Result<T, EditError>;
