//! # CUBELOOM Terrain
//!
//! Arranges voxel chunks into a terrain and sculpts it from a heightmap.
//!
//! ## Design Principles
//!
//! 1. **Barrier first**: nothing is sculpted until every chunk has
//!    committed once, whatever order their events arrive in
//! 2. **Deterministic**: the same seed always gives the same terrain
//! 3. **Owned notifications**: each grid owns its event channel; there
//!    is no process-wide event
//!
//! ## Core Components
//!
//! - `SimplexNoise` / `NoiseSeed`: coherent 2-D noise
//! - `HeightField`: where column heights come from
//! - `TerrainConfig`: TOML-loadable settings
//! - `TerrainGrid`: the chunk lattice and its sculpting pass
//! - `PlayerAnchor`: what gets placed on the terrain afterwards
//!
//! ## Example
//!
//! ```rust
//! use cubeloom_mesh::{ChunkConfig, MeshLibrary};
//! use cubeloom_terrain::{GridPhase, TerrainConfig, TerrainGrid};
//!
//! let config = TerrainConfig {
//!     chunks: [2, 1, 2],
//!     chunk: ChunkConfig::with_extent([8, 8, 8]),
//!     ..TerrainConfig::default()
//! };
//! let mut grid = TerrainGrid::new(config).unwrap();
//! let mut library = MeshLibrary::new();
//!
//! let mut spawn = None;
//! let mut player = |p: [f32; 3]| spawn = Some(p);
//! grid.build(&mut library, Some(&mut player)).unwrap();
//!
//! assert_eq!(grid.phase(), GridPhase::Sculpted);
//! assert_eq!(spawn, Some([8.0, 10.0, 8.0]));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod grid;
pub mod height;
pub mod noise;
pub mod player;

pub use config::{HeightmapConfig, TerrainConfig, MAX_HILL_AMOUNT, MIN_HILL_AMOUNT};
pub use error::{TerrainError, TerrainResult};
pub use grid::{GridPhase, TerrainGrid};
pub use height::{ConstantHeight, HeightField, SimplexHeightField};
pub use noise::{NoiseSeed, Octaves, SimplexNoise};
pub use player::{spawn_point, PlayerAnchor};
