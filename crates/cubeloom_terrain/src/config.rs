//! Terrain configuration.
//!
//! Loaded once, usually from TOML, and validated before any chunk
//! exists:
//!
//! ```toml
//! chunks = [4, 2, 4]
//!
//! [chunk]
//! extent = [16, 16, 16]
//! voxel_half_size = 0.5
//!
//! [heightmap]
//! hill_amount = 2.5
//! seed = 42
//! ```

use cubeloom_mesh::ChunkConfig;
use serde::Deserialize;

use crate::error::{TerrainError, TerrainResult};
use crate::noise::{NoiseSeed, Octaves};

/// Smallest accepted hill amplitude.
pub const MIN_HILL_AMOUNT: f64 = 0.1;

/// Largest accepted hill amplitude.
pub const MAX_HILL_AMOUNT: f64 = 30.0;

/// Heightmap sculpting settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeightmapConfig {
    /// Sculpt the terrain once every chunk is ready.
    pub enabled: bool,
    /// Scales normalized column coordinates before sampling; larger
    /// values give more, narrower hills.
    pub hill_amount: f64,
    /// Noise seed.
    pub seed: NoiseSeed,
    /// Noise layers.
    pub octaves: u32,
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hill_amount: 1.0,
            seed: NoiseSeed::default(),
            octaves: 1,
        }
    }
}

impl HeightmapConfig {
    /// The octave settings for the noise field.
    #[must_use]
    pub fn octaves(&self) -> Octaves {
        Octaves {
            count: self.octaves.max(1),
            ..Octaves::default()
        }
    }
}

/// Shape of a terrain grid.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Chunks along x, y and z.
    pub chunks: [u32; 3],
    /// Settings shared by every chunk.
    pub chunk: ChunkConfig,
    /// Heightmap settings.
    pub heightmap: HeightmapConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunks: [10, 3, 10],
            chunk: ChunkConfig::default(),
            heightmap: HeightmapConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// [`TerrainError::Parse`] for malformed TOML, otherwise whatever
    /// [`TerrainConfig::validate`] rejects.
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the whole configuration, chunk settings included.
    ///
    /// # Errors
    ///
    /// The first problem found, as a [`TerrainError`].
    pub fn validate(&self) -> TerrainResult<()> {
        self.chunk.validate()?;

        if self.chunks.contains(&0) {
            return Err(TerrainError::InvalidChunkCount(self.chunks));
        }

        let hill = self.heightmap.hill_amount;
        if !(MIN_HILL_AMOUNT..=MAX_HILL_AMOUNT).contains(&hill) {
            return Err(TerrainError::HillAmountOutOfRange(hill));
        }

        for axis in 0..3 {
            let voxels = u64::from(self.chunks[axis]) * u64::from(self.chunk.extent[axis]);
            if voxels > i32::MAX as u64 {
                return Err(TerrainError::TerrainTooLarge { axis, voxels });
            }
        }
        Ok(())
    }

    /// Voxels along x, y and z across the whole terrain.
    #[must_use]
    pub fn total_extent(&self) -> [u32; 3] {
        std::array::from_fn(|k| self.chunks[k] * self.chunk.extent[k])
    }

    /// Number of chunks in the grid.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().map(|c| *c as usize).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeloom_mesh::VoxelType;

    #[test]
    fn test_defaults() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_extent(), [100, 30, 100]);
        assert_eq!(config.chunk_count(), 300);
    }

    #[test]
    fn test_parse_partial_document() {
        let config = TerrainConfig::from_toml_str(
            r#"
            chunks = [2, 1, 3]

            [chunk]
            extent = [8, 4, 8]
            culling = false
            default_type = "stone"

            [heightmap]
            hill_amount = 4.0
            seed = 1234
            "#,
        )
        .unwrap();

        assert_eq!(config.chunks, [2, 1, 3]);
        assert_eq!(config.chunk.extent, [8, 4, 8]);
        assert!(!config.chunk.culling);
        assert_eq!(config.chunk.default_type, VoxelType::Stone);
        assert_eq!(config.chunk.voxel_half_size, 0.5);
        assert!(config.heightmap.enabled);
        assert_eq!(config.heightmap.seed, NoiseSeed::new(1234));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            TerrainConfig::from_toml_str("chunks = [1, 0, 1]"),
            Err(TerrainError::InvalidChunkCount([1, 0, 1]))
        ));
        assert!(matches!(
            TerrainConfig::from_toml_str("[heightmap]\nhill_amount = 31.0"),
            Err(TerrainError::HillAmountOutOfRange(_))
        ));
        assert!(matches!(
            TerrainConfig::from_toml_str("[chunk]\nvoxel_half_size = 0.1"),
            Err(TerrainError::Mesh(_))
        ));
        assert!(matches!(TerrainConfig::from_toml_str("chunks = "), Err(TerrainError::Parse(_))));
    }

    #[test]
    fn test_world_coordinate_overflow() {
        let config = TerrainConfig {
            chunks: [u32::MAX, 1, 1],
            chunk: ChunkConfig::with_extent([2, 1, 1]),
            ..TerrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(TerrainError::TerrainTooLarge { axis: 0, .. })));
    }
}
