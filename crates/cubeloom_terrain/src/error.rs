//! # Terrain Error Types
//!
//! Everything that can stop a terrain grid from being built. All of it
//! is caught before the first chunk is allocated.

use cubeloom_mesh::MeshError;
use thiserror::Error;

/// Errors raised while configuring or building a terrain grid.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// The per-chunk configuration was rejected.
    #[error("invalid chunk configuration: {0}")]
    Mesh(#[from] MeshError),

    /// A terrain extent (in chunks) was zero.
    #[error("terrain must be at least 1 chunk on every axis, got {0:?}")]
    InvalidChunkCount([u32; 3]),

    /// Hill amplitude outside the supported range.
    #[error("hill amount {0} outside [{min}, {max}]", min = crate::config::MIN_HILL_AMOUNT, max = crate::config::MAX_HILL_AMOUNT)]
    HillAmountOutOfRange(f64),

    /// The terrain spans more voxels on one axis than world coordinates hold.
    #[error("terrain spans {voxels} voxels on axis {axis}, more than i32 world coordinates allow")]
    TerrainTooLarge {
        /// 0 = x, 1 = y, 2 = z.
        axis: usize,
        /// Voxels along that axis.
        voxels: u64,
    },

    /// The TOML document could not be parsed.
    #[error("failed to parse terrain config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
