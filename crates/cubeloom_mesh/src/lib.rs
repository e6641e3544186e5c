//! # CUBELOOM Mesh
//!
//! Renderable surface geometry for voxel chunks.
//!
//! ## Design Principles
//!
//! 1. **Fixed slots**: every cell owns 24 vertices, 24 UVs and 36 indices
//!    in its chunk's buffers, assigned once at initialization
//! 2. **Degenerate hiding**: a hidden face keeps its 6 indices, collapsed
//!    onto one vertex, so toggling a face is O(1) and never resizes
//! 3. **Tables, not switches**: face corners, triangle fans, UV corner
//!    orders and texture tiles are constant lookup tables
//!
//! ## Core Components
//!
//! - `Face` / `FaceMask`: the six cube sides and their bits
//! - `VoxelType` / `TextureTile` / `AtlasLayout`: texturing
//! - `VoxelCell`: writes one cell's geometry into shared buffers
//! - `Chunk`: owns the cells and buffers, culls and commits
//! - `MeshSink`: the renderer/collider boundary
//!
//! ## Example
//!
//! ```rust
//! use cubeloom_mesh::{Chunk, ChunkConfig, MeshLibrary};
//!
//! let mut chunk = Chunk::new(ChunkConfig::default(), [0, 0, 0]).unwrap();
//! chunk.initialize();
//!
//! let mut library = MeshLibrary::new();
//! chunk.commit(&mut library);
//! assert!(chunk.is_ready());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod buffers;
pub mod cell;
pub mod chunk;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod face;
pub mod sink;
pub mod texture;

pub use buffers::{MeshBuffers, INDICES_PER_CELL, UVS_PER_CELL, VERTICES_PER_CELL};
pub use cell::{CellSlots, VoxelCell};
pub use chunk::{Chunk, ChunkState, ADD_PROBE_DEPTH, REMOVE_PROBE_DEPTH};
pub use config::{ChunkConfig, MAX_VOXEL_HALF_SIZE, MIN_VOXEL_HALF_SIZE};
pub use error::{EditError, EditResult, MeshError, MeshResult};
pub use events::{rendered_channel, ChunkRendered};
pub use face::{Face, FaceMask};
pub use sink::{Bounds, ChunkMeshView, MeshLibrary, MeshSink, UploadedMesh};
pub use texture::{AtlasLayout, FaceTiles, TextureTile, UvRect, VoxelType};
