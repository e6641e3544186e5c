//! # Terrain Grid
//!
//! A 3-D lattice of chunks sculpted from a heightmap.
//!
//! ## Flow
//!
//! ```text
//! initialize()  create + allocate every chunk, each holding a sender
//! render_all()  first commit of every chunk, each sends ChunkRendered
//! pump()        drain events; once every chunk is ready:
//!                 sculpt -> re-commit all -> place player
//! ```
//!
//! The barrier is level-triggered: each event rescans every chunk's
//! readiness flag, so arrival order and duplicates do not matter.
//! Sculpting happens once per grid.

use crossbeam_channel::{Receiver, Sender};
use cubeloom_mesh::{rendered_channel, Chunk, ChunkRendered, MeshSink, VoxelType};

use crate::config::TerrainConfig;
use crate::error::{TerrainError, TerrainResult};
use crate::height::{HeightField, SimplexHeightField};
use crate::player::{spawn_point, PlayerAnchor};

/// Where the grid is relative to its one sculpting pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridPhase {
    /// Waiting for every chunk to report ready.
    Pending,
    /// Sculpted and re-committed. Later events are ignored.
    Sculpted,
}

/// Owns a lattice of chunks and drives their terrain pass.
pub struct TerrainGrid {
    config: TerrainConfig,
    /// Indexed `[x][y][z]`, flattened.
    chunks: Vec<Chunk>,
    height: Box<dyn HeightField>,
    events_tx: Sender<ChunkRendered>,
    events_rx: Receiver<ChunkRendered>,
    phase: GridPhase,
}

impl std::fmt::Debug for TerrainGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainGrid")
            .field("chunks", &self.config.chunks)
            .field("initialized", &self.is_initialized())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl TerrainGrid {
    /// Validates `config` and prepares an empty grid using simplex noise
    /// for heights.
    ///
    /// # Errors
    ///
    /// Whatever [`TerrainConfig::validate`] rejects.
    pub fn new(config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        let heightmap = config.heightmap;
        let (events_tx, events_rx) = rendered_channel();
        Ok(Self {
            config,
            chunks: Vec::new(),
            height: Box::new(SimplexHeightField::with_octaves(heightmap.seed, heightmap.octaves())),
            events_tx,
            events_rx,
            phase: GridPhase::Pending,
        })
    }

    /// Replaces the height source.
    #[must_use]
    pub fn with_height_field<H: HeightField + 'static>(mut self, field: H) -> Self {
        self.height = Box::new(field);
        self
    }

    /// Creates and allocates every chunk. Does nothing the second time.
    ///
    /// Chunks are created x outer, z middle, y inner; chunk `(x, y, z)`
    /// sits at world `(x * ex, y * ey, z * ez)` for chunk extent `e`.
    ///
    /// # Errors
    ///
    /// A [`TerrainError`] if a chunk cannot be built. Validation in
    /// [`TerrainGrid::new`] normally rules this out.
    pub fn initialize(&mut self) -> TerrainResult<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let [cx, cy, cz] = self.config.chunks;
        let mut slots: Vec<Option<Chunk>> = std::iter::repeat_with(|| None).take(self.config.chunk_count()).collect();

        for x in 0..cx {
            for z in 0..cz {
                for y in 0..cy {
                    let origin = self.chunk_origin([x, y, z])?;
                    let mut chunk = Chunk::new(self.config.chunk, origin)?;
                    chunk.subscribe(self.events_tx.clone());
                    chunk.initialize();
                    slots[self.ordinal([x, y, z])] = Some(chunk);
                }
            }
        }

        self.chunks = slots.into_iter().flatten().collect();
        tracing::debug!(chunks = self.chunks.len(), "terrain grid initialized");
        Ok(())
    }

    /// Commits every chunk once, which makes each of them ready.
    pub fn render_all<S: MeshSink + ?Sized>(&mut self, sink: &mut S) {
        for chunk in &mut self.chunks {
            chunk.commit(sink);
        }
    }

    /// Handles every queued rendered event.
    ///
    /// When an event finds every chunk ready the grid is sculpted,
    /// re-committed into `sink`, and `player` (if any) is placed above
    /// the terrain center. Returns the number of events handled.
    pub fn pump<S: MeshSink + ?Sized>(&mut self, sink: &mut S, player: Option<&mut dyn PlayerAnchor>) -> usize {
        let mut player = player;
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            if self.on_chunk_rendered(event, sink) {
                if let Some(player) = player.take() {
                    let position = spawn_point(self.config.total_extent());
                    player.place(position);
                    tracing::info!(?position, "player placed");
                }
            }
        }
        handled
    }

    /// Initializes, renders every chunk and runs the barrier.
    ///
    /// # Errors
    ///
    /// Same as [`TerrainGrid::initialize`].
    pub fn build<S: MeshSink + ?Sized>(&mut self, sink: &mut S, player: Option<&mut dyn PlayerAnchor>) -> TerrainResult<()> {
        self.initialize()?;
        self.render_all(sink);
        self.pump(sink, player);
        Ok(())
    }

    /// Runs the barrier for one event. True if this event opened it.
    fn on_chunk_rendered<S: MeshSink + ?Sized>(&mut self, event: ChunkRendered, sink: &mut S) -> bool {
        if self.phase == GridPhase::Sculpted {
            tracing::debug!(position = ?event.position, "rendered event after sculpting, ignored");
            return false;
        }

        if !self.all_ready() {
            let pending = self.chunks.iter().filter(|c| !c.is_ready()).count();
            tracing::debug!(position = ?event.position, pending, "waiting for chunks");
            return false;
        }

        tracing::info!(chunks = self.chunks.len(), "all chunks ready");
        if self.config.heightmap.enabled {
            self.sculpt();
        }
        self.recommit(sink);
        self.phase = GridPhase::Sculpted;
        tracing::info!("terrain sculpted");
        true
    }

    /// Overwrites every column from the heightmap: off above the column
    /// height, grass at it, dirt below.
    fn sculpt(&mut self) {
        let [tx, _, tz] = self.config.total_extent();
        let [ex, ey, ez] = self.config.chunk.extent.map(|e| e as usize);
        let cy = self.config.chunks[1] as usize;

        for wx in 0..tx as usize {
            for wz in 0..tz as usize {
                let height = self.column_height(wx, wz) as usize;
                let (chunk_x, lx) = (wx / ex, wx % ex);
                let (chunk_z, lz) = (wz / ez, wz % ez);

                for chunk_y in 0..cy {
                    let index = self.ordinal_usize([chunk_x, chunk_y, chunk_z]);
                    let chunk = &mut self.chunks[index];
                    for ly in 0..ey {
                        let wy = chunk_y * ey + ly;
                        match wy.cmp(&height) {
                            std::cmp::Ordering::Greater => chunk.clear_cell(lx, ly, lz),
                            std::cmp::Ordering::Equal => chunk.set_cell_type(lx, ly, lz, VoxelType::Grass),
                            std::cmp::Ordering::Less => chunk.set_cell_type(lx, ly, lz, VoxelType::Dirt),
                        }
                    }
                }
            }
        }
    }

    /// Commits every chunk, x outer, z middle, y inner.
    fn recommit<S: MeshSink + ?Sized>(&mut self, sink: &mut S) {
        let [cx, cy, cz] = self.config.chunks.map(|c| c as usize);
        for x in 0..cx {
            for z in 0..cz {
                for y in 0..cy {
                    let index = self.ordinal_usize([x, y, z]);
                    self.chunks[index].commit(sink);
                }
            }
        }
    }

    /// Integer height of the terrain column at world voxel `(x, z)`:
    /// the heightmap sample times the total vertical extent, rounded to
    /// nearest with ties to even.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn column_height(&self, x: usize, z: usize) -> u32 {
        let [tx, ty, tz] = self.config.total_extent().map(f64::from);
        let hill = self.config.heightmap.hill_amount;
        let u = x as f64 / tx * hill;
        let v = z as f64 / tz * hill;
        // sample() is in [0, 1], so the product is in [0, ty].
        (self.height.sample(u, v).clamp(0.0, 1.0) * ty).round_ties_even() as u32
    }

    /// True if every chunk has committed at least once.
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.is_initialized() && self.chunks.iter().all(Chunk::is_ready)
    }

    /// True once [`TerrainGrid::initialize`] has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// Sculpting phase.
    #[must_use]
    pub const fn phase(&self) -> GridPhase {
        self.phase
    }

    /// The grid's configuration.
    #[must_use]
    pub const fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The chunk at lattice position `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the grid is not initialized or the position is outside it.
    #[must_use]
    pub fn chunk(&self, x: u32, y: u32, z: u32) -> &Chunk {
        &self.chunks[self.checked_ordinal([x, y, z])]
    }

    /// Mutable access to the chunk at lattice position `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Same as [`TerrainGrid::chunk`].
    pub fn chunk_mut(&mut self, x: u32, y: u32, z: u32) -> &mut Chunk {
        let index = self.checked_ordinal([x, y, z]);
        &mut self.chunks[index]
    }

    /// The chunk whose cells contain world `point`, for routing edits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn chunk_at_point_mut(&mut self, point: [f32; 3]) -> Option<&mut Chunk> {
        if !self.is_initialized() || point.iter().any(|c| !c.is_finite()) {
            return None;
        }
        let mut lattice = [0u32; 3];
        for k in 0..3 {
            let voxel = point[k].round() as i64;
            let chunk = voxel.div_euclid(i64::from(self.config.chunk.extent[k]));
            lattice[k] = u32::try_from(chunk).ok().filter(|c| *c < self.config.chunks[k])?;
        }
        let index = self.ordinal(lattice);
        self.chunks.get_mut(index)
    }

    /// Iterates all chunks in `[x][y][z]` order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    fn chunk_origin(&self, lattice: [u32; 3]) -> TerrainResult<[i32; 3]> {
        let mut origin = [0i32; 3];
        for axis in 0..3 {
            let voxels = u64::from(lattice[axis]) * u64::from(self.config.chunk.extent[axis]);
            origin[axis] = i32::try_from(voxels).map_err(|_| TerrainError::TerrainTooLarge { axis, voxels })?;
        }
        Ok(origin)
    }

    fn ordinal(&self, lattice: [u32; 3]) -> usize {
        self.ordinal_usize(lattice.map(|c| c as usize))
    }

    fn ordinal_usize(&self, [x, y, z]: [usize; 3]) -> usize {
        let [_, cy, cz] = self.config.chunks.map(|c| c as usize);
        (x * cy + y) * cz + z
    }

    fn checked_ordinal(&self, lattice: [u32; 3]) -> usize {
        assert!(self.is_initialized(), "terrain grid used before initialize()");
        let chunks = self.config.chunks;
        assert!(
            lattice.iter().zip(chunks).all(|(l, c)| *l < c),
            "chunk {lattice:?} outside grid {chunks:?}"
        );
        self.ordinal(lattice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height::ConstantHeight;
    use cubeloom_mesh::{ChunkConfig, MeshLibrary};

    fn small_config(chunks: [u32; 3], extent: [u32; 3]) -> TerrainConfig {
        TerrainConfig {
            chunks,
            chunk: ChunkConfig::with_extent(extent),
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn test_chunk_origins_and_order() {
        let mut grid = TerrainGrid::new(small_config([2, 3, 2], [4, 5, 6])).unwrap();
        grid.initialize().unwrap();
        assert_eq!(grid.chunks().count(), 12);
        assert_eq!(grid.chunk(1, 2, 1).origin(), [4, 10, 6]);
        assert_eq!(grid.chunk(0, 1, 0).origin(), [0, 5, 0]);
        // [x][y][z] storage.
        let origins: Vec<_> = grid.chunks().take(3).map(Chunk::origin).collect();
        assert_eq!(origins, vec![[0, 0, 0], [0, 0, 6], [0, 5, 0]]);
        assert!(grid.chunks().all(|c| c.subscriber_count() == 1));
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let mut grid = TerrainGrid::new(small_config([1, 1, 2], [2, 2, 2])).unwrap();
        grid.initialize().unwrap();
        let first = grid.chunk(0, 0, 1).buffers().positions().as_ptr();
        grid.initialize().unwrap();
        assert_eq!(grid.chunk(0, 0, 1).buffers().positions().as_ptr(), first);
    }

    #[test]
    fn test_column_height_rounds() {
        let grid = TerrainGrid::new(small_config([1, 2, 1], [4, 4, 4]))
            .unwrap()
            .with_height_field(ConstantHeight(0.45));
        // 0.45 * 8 = 3.6
        assert_eq!(grid.column_height(0, 0), 4);
    }

    #[test]
    fn test_column_height_ties_round_to_even() {
        // 0.5 * 5 = 2.5
        let grid = TerrainGrid::new(small_config([1, 1, 1], [4, 5, 4]))
            .unwrap()
            .with_height_field(ConstantHeight(0.5));
        assert_eq!(grid.column_height(0, 0), 2);

        // 0.5 * 7 = 3.5
        let grid = TerrainGrid::new(small_config([1, 1, 1], [4, 7, 4]))
            .unwrap()
            .with_height_field(ConstantHeight(0.5));
        assert_eq!(grid.column_height(0, 0), 4);
    }

    #[test]
    fn test_column_coordinates_are_scaled_by_hill_amount() {
        let mut config = small_config([2, 1, 1], [5, 10, 4]);
        config.heightmap.hill_amount = 2.0;
        // Height equals u / 2, so it tracks x / total_x.
        let grid = TerrainGrid::new(config).unwrap().with_height_field(|u: f64, _v: f64| u / 2.0);
        assert_eq!(grid.column_height(0, 0), 0);
        assert_eq!(grid.column_height(5, 0), 5);
        assert_eq!(grid.column_height(9, 3), 9);
    }

    #[test]
    fn test_late_events_are_ignored() {
        let mut grid = TerrainGrid::new(small_config([1, 1, 1], [2, 2, 2]))
            .unwrap()
            .with_height_field(ConstantHeight(0.5));
        let mut library = MeshLibrary::new();
        grid.build(&mut library, None).unwrap();
        assert_eq!(grid.phase(), GridPhase::Sculpted);

        let commits = grid.chunk(0, 0, 0).commit_count();
        grid.events_tx.send(ChunkRendered { position: [0, 0, 0] }).unwrap();
        assert_eq!(grid.pump(&mut library, None), 1);
        assert_eq!(grid.chunk(0, 0, 0).commit_count(), commits);
    }

    #[test]
    fn test_duplicate_events_do_not_open_barrier() {
        let mut grid = TerrainGrid::new(small_config([2, 1, 1], [2, 2, 2])).unwrap();
        grid.initialize().unwrap();
        let mut library = MeshLibrary::new();

        grid.chunk_mut(0, 0, 0).commit(&mut library);
        for _ in 0..3 {
            grid.events_tx.send(ChunkRendered { position: [0, 0, 0] }).unwrap();
        }
        assert_eq!(grid.pump(&mut library, None), 4);
        assert_eq!(grid.phase(), GridPhase::Pending);

        grid.chunk_mut(1, 0, 0).commit(&mut library);
        assert_eq!(grid.pump(&mut library, None), 1);
        assert_eq!(grid.phase(), GridPhase::Sculpted);
    }

    #[test]
    fn test_chunk_at_point() {
        let mut grid = TerrainGrid::new(small_config([2, 1, 2], [4, 4, 4])).unwrap();
        grid.initialize().unwrap();
        assert_eq!(grid.chunk_at_point_mut([5.2, 1.0, 0.4]).map(|c| c.origin()), Some([4, 0, 0]));
        assert_eq!(grid.chunk_at_point_mut([3.6, 1.0, 7.0]).map(|c| c.origin()), Some([4, 0, 4]));
        assert!(grid.chunk_at_point_mut([-0.6, 1.0, 0.0]).is_none());
        assert!(grid.chunk_at_point_mut([0.0, 4.5, 0.0]).is_none());
    }
}
