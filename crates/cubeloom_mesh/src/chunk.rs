//! # Voxel Chunk
//!
//! A fixed-size block of cells and the one buffer set they share.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize()--> Initialized --commit()--> Committed --commit()--> ...
//! ```
//!
//! The buffers are allocated once by `initialize()`. Edits, culling and
//! sculpting only rewrite slots in place. The first `commit()` marks the
//! chunk ready and sends a [`ChunkRendered`] to every subscriber.

use crossbeam_channel::Sender;

use crate::buffers::MeshBuffers;
use crate::cell::{CellSlots, VoxelCell};
use crate::config::ChunkConfig;
use crate::error::{EditError, EditResult, MeshResult};
use crate::events::{ChunkRendered, Subscribers};
use crate::face::Face;
use crate::sink::{ChunkMeshView, MeshSink};
use crate::texture::VoxelType;

/// Normal offset applied to a hit point before removing a voxel.
///
/// Negative: the probe lands inside the surface that was hit.
pub const REMOVE_PROBE_DEPTH: f32 = -0.1;

/// Normal offset applied to a hit point before adding a voxel.
pub const ADD_PROBE_DEPTH: f32 = 0.9;

/// Where a chunk is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Created, no buffers yet.
    Uninitialized,
    /// Buffers and cells exist, never published.
    Initialized,
    /// Published at least once.
    Committed,
}

/// A block of voxels owning its cells and shared mesh buffers.
#[derive(Debug)]
pub struct Chunk {
    config: ChunkConfig,
    origin: [i32; 3],
    cells: Vec<VoxelCell>,
    buffers: MeshBuffers,
    state: ChunkState,
    ready: bool,
    commit_count: u64,
    subscribers: Subscribers,
}

impl Chunk {
    /// Creates an uninitialized chunk whose lattice origin sits at `origin`.
    ///
    /// # Errors
    ///
    /// Returns the [`ChunkConfig::validate`] error for a bad config.
    pub fn new(config: ChunkConfig, origin: [i32; 3]) -> MeshResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            origin,
            cells: Vec::new(),
            buffers: MeshBuffers::default(),
            state: ChunkState::Uninitialized,
            ready: false,
            commit_count: 0,
            subscribers: Subscribers::default(),
        })
    }

    /// Registers a sender for this chunk's rendered notification.
    ///
    /// A sender added after the first commit never hears from this chunk.
    pub fn subscribe(&mut self, sender: Sender<ChunkRendered>) {
        self.subscribers.add(sender);
    }

    /// Number of live notification subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Allocates buffers and creates every cell, occupied and of the
    /// default type. Does nothing on an initialized chunk.
    pub fn initialize(&mut self) {
        if self.state != ChunkState::Uninitialized {
            return;
        }

        let [ex, ey, ez] = self.config.extent;
        let count = self.config.cell_count();
        self.buffers = MeshBuffers::with_cells(count);
        self.cells = Vec::with_capacity(count);

        let atlas = self.config.atlas;
        let mut ordinal = 0;
        for x in 0..ex {
            for y in 0..ey {
                for z in 0..ez {
                    let cell = VoxelCell::new(
                        CellSlots::for_ordinal(ordinal),
                        [x, y, z],
                        self.config.voxel_half_size,
                        self.config.default_type,
                        &mut self.buffers,
                        &atlas,
                    );
                    self.cells.push(cell);
                    ordinal += 1;
                }
            }
        }

        self.state = ChunkState::Initialized;
        tracing::debug!(origin = ?self.origin, cells = count, "chunk initialized");
    }

    /// Re-culls if enabled, publishes the buffers to `sink`, and on the
    /// first call marks the chunk ready and notifies subscribers.
    ///
    /// # Panics
    ///
    /// Panics if the chunk was never initialized.
    pub fn commit<S: MeshSink + ?Sized>(&mut self, sink: &mut S) {
        self.assert_initialized();

        let culled = if self.config.culling { self.cull() } else { 0 };
        sink.publish(&self.mesh_view());
        self.commit_count += 1;
        self.state = ChunkState::Committed;

        if !self.ready {
            self.ready = true;
            self.subscribers.notify(ChunkRendered { position: self.origin });
        }

        tracing::debug!(
            origin = ?self.origin,
            commits = self.commit_count,
            culled_faces = culled,
            "chunk committed"
        );
    }

    /// Turns off the cell just behind a hit surface, then commits.
    ///
    /// Returns the cell that was cleared. A skipped edit is logged and
    /// returned as an error; the commit happens either way.
    ///
    /// # Errors
    ///
    /// [`EditError`] if the probe leaves the chunk, the cell is already
    /// empty, or the hit data is not finite.
    ///
    /// # Panics
    ///
    /// Panics if the chunk was never initialized.
    pub fn apply_edit_remove<S: MeshSink + ?Sized>(
        &mut self,
        sink: &mut S,
        point: [f32; 3],
        normal: [f32; 3],
    ) -> EditResult<[usize; 3]> {
        self.assert_initialized();
        let outcome = self.remove_at_probe(point, normal);
        self.finish_edit("remove", &outcome, sink);
        outcome
    }

    /// Turns on the cell just in front of a hit surface as `voxel_type`,
    /// then commits. An occupied cell of another type is retyped.
    ///
    /// # Errors
    ///
    /// [`EditError`] if the probe leaves the chunk, the cell already holds
    /// `voxel_type`, or the hit data is not finite.
    ///
    /// # Panics
    ///
    /// Panics if the chunk was never initialized.
    pub fn apply_edit_add<S: MeshSink + ?Sized>(
        &mut self,
        sink: &mut S,
        point: [f32; 3],
        normal: [f32; 3],
        voxel_type: VoxelType,
    ) -> EditResult<[usize; 3]> {
        self.assert_initialized();
        let outcome = self.add_at_probe(point, normal, voxel_type);
        self.finish_edit("add", &outcome, sink);
        outcome
    }

    fn remove_at_probe(&mut self, point: [f32; 3], normal: [f32; 3]) -> EditResult<[usize; 3]> {
        let cell = self.locate(probe(point, normal, REMOVE_PROBE_DEPTH)?)?;
        let index = self.ordinal(cell);
        if !self.cells[index].is_on() {
            return Err(EditError::AlreadyInState { cell });
        }
        self.cells[index].turn_off(&mut self.buffers);
        Ok(cell)
    }

    fn add_at_probe(&mut self, point: [f32; 3], normal: [f32; 3], voxel_type: VoxelType) -> EditResult<[usize; 3]> {
        let cell = self.locate(probe(point, normal, ADD_PROBE_DEPTH)?)?;
        let index = self.ordinal(cell);
        if self.cells[index].is_on() && self.cells[index].voxel_type() == voxel_type {
            return Err(EditError::AlreadyInState { cell });
        }
        self.cells[index].turn_on(&mut self.buffers, &self.config.atlas, voxel_type);
        Ok(cell)
    }

    fn finish_edit<S: MeshSink + ?Sized>(&mut self, kind: &str, outcome: &EditResult<[usize; 3]>, sink: &mut S) {
        if let Err(err) = outcome {
            tracing::warn!(origin = ?self.origin, edit = kind, %err, "voxel edit skipped");
        }
        self.commit(sink);
    }

    /// Maps a world point to the chunk-local cell containing it.
    ///
    /// Rounds half away from zero, subtracts the chunk origin, then
    /// bounds-checks against the extent.
    ///
    /// # Errors
    ///
    /// [`EditError::NonFiniteHit`] for NaN or infinite input,
    /// [`EditError::OutOfBounds`] if the cell is outside this chunk.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn locate(&self, point: [f32; 3]) -> EditResult<[usize; 3]> {
        if point.iter().any(|c| !c.is_finite()) {
            return Err(EditError::NonFiniteHit);
        }

        // Far points saturate the cast; saturate the subtraction too.
        let lattice: [i64; 3] =
            std::array::from_fn(|k| (point[k].round() as i64).saturating_sub(i64::from(self.origin[k])));

        let extent = self.config.extent;
        let inside = lattice.iter().zip(extent).all(|(l, e)| (0..i64::from(e)).contains(l));
        if !inside {
            return Err(EditError::OutOfBounds { lattice, extent });
        }
        Ok(lattice.map(|l| l as usize))
    }

    /// Turns the cell on as `voxel_type`, unconditionally.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the chunk or the chunk was
    /// never initialized.
    pub fn set_cell_type(&mut self, x: usize, y: usize, z: usize, voxel_type: VoxelType) {
        let index = self.checked_ordinal([x, y, z]);
        self.cells[index].turn_on(&mut self.buffers, &self.config.atlas, voxel_type);
    }

    /// Turns the cell off, unconditionally.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the chunk or the chunk was
    /// never initialized.
    pub fn clear_cell(&mut self, x: usize, y: usize, z: usize) {
        let index = self.checked_ordinal([x, y, z]);
        self.cells[index].turn_off(&mut self.buffers);
    }

    /// The cell at a chunk-local coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the chunk or the chunk was
    /// never initialized.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize, z: usize) -> &VoxelCell {
        &self.cells[self.checked_ordinal([x, y, z])]
    }

    /// True if the cell at a chunk-local coordinate is occupied.
    ///
    /// # Panics
    ///
    /// Same as [`Chunk::cell`].
    #[must_use]
    pub fn is_on(&self, x: usize, y: usize, z: usize) -> bool {
        self.cell(x, y, z).is_on()
    }

    /// Cells along x, y and z.
    #[inline]
    #[must_use]
    pub const fn extent(&self) -> [u32; 3] {
        self.config.extent
    }

    /// World position of cell `(0, 0, 0)`.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> [i32; 3] {
        self.origin
    }

    /// The config this chunk was built from.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ChunkState {
        self.state
    }

    /// True once the chunk has been committed.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of commits so far.
    #[inline]
    #[must_use]
    pub const fn commit_count(&self) -> u64 {
        self.commit_count
    }

    /// The shared buffers.
    #[inline]
    #[must_use]
    pub const fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Borrows the buffers as they would be published.
    #[must_use]
    pub fn mesh_view(&self) -> ChunkMeshView<'_> {
        ChunkMeshView {
            origin: self.origin,
            positions: self.buffers.positions(),
            uvs: self.buffers.uvs(),
            indices: self.buffers.indices(),
        }
    }

    /// Hides every face of an occupied cell whose in-chunk neighbor is
    /// occupied, shows the rest. Returns the number of hidden faces.
    fn cull(&mut self) -> usize {
        let mut culled = 0;
        for index in 0..self.cells.len() {
            if !self.cells[index].is_on() {
                continue;
            }
            let lattice = self.cells[index].lattice();
            for face in Face::ALL {
                let hidden = self.neighbor_on(lattice, face);
                self.cells[index].set_face(&mut self.buffers, face, !hidden);
                culled += usize::from(hidden);
            }
        }
        culled
    }

    fn neighbor_on(&self, lattice: [u32; 3], face: Face) -> bool {
        let offset = face.neighbor_offset();
        let mut neighbor = [0_usize; 3];
        for k in 0..3 {
            let n = i64::from(lattice[k]) + i64::from(offset[k]);
            match usize::try_from(n) {
                Ok(n) if n < self.config.extent[k] as usize => neighbor[k] = n,
                _ => return false,
            }
        }
        self.cells[self.ordinal(neighbor)].is_on()
    }

    fn ordinal(&self, [x, y, z]: [usize; 3]) -> usize {
        let [_, ey, ez] = self.config.extent.map(|e| e as usize);
        (x * ey + y) * ez + z
    }

    fn checked_ordinal(&self, cell: [usize; 3]) -> usize {
        self.assert_initialized();
        let extent = self.config.extent;
        assert!(
            cell.iter().zip(extent).all(|(c, e)| *c < e as usize),
            "cell {cell:?} outside chunk extent {extent:?}"
        );
        self.ordinal(cell)
    }

    fn assert_initialized(&self) {
        assert!(
            self.state != ChunkState::Uninitialized,
            "chunk at {:?} used before initialize()",
            self.origin
        );
    }
}

/// Offsets a hit point along its normal.
fn probe(point: [f32; 3], normal: [f32; 3], depth: f32) -> EditResult<[f32; 3]> {
    if point.iter().chain(normal.iter()).any(|c| !c.is_finite()) {
        return Err(EditError::NonFiniteHit);
    }
    Ok(std::array::from_fn(|k| point[k] + normal[k] * depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::rendered_channel;
    use crate::sink::MeshLibrary;

    fn built(extent: [u32; 3]) -> (Chunk, MeshLibrary) {
        let mut chunk = Chunk::new(ChunkConfig::with_extent(extent), [0, 0, 0]).unwrap();
        chunk.initialize();
        let mut library = MeshLibrary::new();
        chunk.commit(&mut library);
        (chunk, library)
    }

    fn face_degenerate(chunk: &Chunk, cell: [usize; 3], face: Face) -> bool {
        !chunk.cell(cell[0], cell[1], cell[2]).face_visible(chunk.buffers(), face)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(Chunk::new(ChunkConfig::with_extent([0, 1, 1]), [0, 0, 0]).is_err());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut chunk = Chunk::new(ChunkConfig::with_extent([2, 3, 4]), [0, 0, 0]).unwrap();
        assert_eq!(chunk.state(), ChunkState::Uninitialized);
        chunk.initialize();
        let before = chunk.buffers().clone();
        let ptr = chunk.buffers().positions().as_ptr();

        chunk.initialize();
        assert_eq!(chunk.state(), ChunkState::Initialized);
        assert_eq!(chunk.buffers(), &before);
        assert_eq!(chunk.buffers().positions().as_ptr(), ptr);
        assert_eq!(chunk.buffers().cell_count(), 24);
    }

    #[test]
    fn test_iteration_order_is_x_y_z() {
        let mut chunk = Chunk::new(ChunkConfig::with_extent([2, 3, 4]), [0, 0, 0]).unwrap();
        chunk.initialize();
        // (1, 2, 3) is the last cell; (0, 0, 1) is the second.
        assert_eq!(chunk.cell(1, 2, 3).slots(), CellSlots::for_ordinal(23));
        assert_eq!(chunk.cell(0, 0, 1).slots(), CellSlots::for_ordinal(1));
        assert_eq!(chunk.cell(0, 1, 0).slots(), CellSlots::for_ordinal(4));
    }

    #[test]
    fn test_culling_hides_shared_faces() {
        let (chunk, _) = built([3, 3, 3]);
        // Center cell is fully enclosed.
        for face in Face::ALL {
            assert!(face_degenerate(&chunk, [1, 1, 1], face));
        }
        // Corner cell shows exactly its three boundary faces.
        assert!(!face_degenerate(&chunk, [0, 0, 0], Face::Left));
        assert!(!face_degenerate(&chunk, [0, 0, 0], Face::Down));
        assert!(!face_degenerate(&chunk, [0, 0, 0], Face::Back));
        assert!(face_degenerate(&chunk, [0, 0, 0], Face::Right));
        assert!(face_degenerate(&chunk, [0, 0, 0], Face::Up));
        assert!(face_degenerate(&chunk, [0, 0, 0], Face::Forward));
    }

    #[test]
    fn test_culling_disabled_keeps_all_faces() {
        let config = ChunkConfig { culling: false, ..ChunkConfig::with_extent([2, 2, 2]) };
        let mut chunk = Chunk::new(config, [0, 0, 0]).unwrap();
        chunk.initialize();
        chunk.commit(&mut MeshLibrary::new());
        assert!(Face::ALL.iter().all(|f| !face_degenerate(&chunk, [0, 0, 0], *f)));
    }

    #[test]
    fn test_first_commit_notifies_once() {
        let (tx, rx) = rendered_channel();
        let mut chunk = Chunk::new(ChunkConfig::with_extent([1, 1, 1]), [20, 0, -10]).unwrap();
        chunk.subscribe(tx);
        chunk.initialize();

        let mut library = MeshLibrary::new();
        chunk.commit(&mut library);
        chunk.commit(&mut library);

        assert!(chunk.is_ready());
        assert_eq!(chunk.commit_count(), 2);
        assert_eq!(chunk.state(), ChunkState::Committed);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ChunkRendered { position: [20, 0, -10] }]);
        assert_eq!(library.publish_count(), 2);
    }

    #[test]
    #[should_panic(expected = "used before initialize")]
    fn test_commit_before_initialize_panics() {
        let mut chunk = Chunk::new(ChunkConfig::default(), [0, 0, 0]).unwrap();
        chunk.commit(&mut MeshLibrary::new());
    }

    #[test]
    fn test_locate_rounds_half_away_from_zero() {
        let chunk = Chunk::new(ChunkConfig::with_extent([4, 4, 4]), [10, 0, 0]).unwrap();
        assert_eq!(chunk.locate([11.5, 0.49, 2.5]), Ok([2, 0, 3]));
        assert_eq!(chunk.locate([9.5, 0.0, 0.0]), Ok([0, 0, 0]));
        assert_eq!(
            chunk.locate([9.4, 0.0, 0.0]),
            Err(EditError::OutOfBounds { lattice: [-1, 0, 0], extent: [4, 4, 4] })
        );
        assert_eq!(chunk.locate([f32::NAN, 0.0, 0.0]), Err(EditError::NonFiniteHit));
    }

    #[test]
    fn test_remove_then_add_restores_faces() {
        let (mut chunk, mut library) = built([3, 3, 3]);
        let before = chunk.buffers().clone();

        // Top face of (1, 2, 1), hit from above.
        let removed = chunk.apply_edit_remove(&mut library, [1.0, 2.5, 1.0], [0.0, 1.0, 0.0]);
        assert_eq!(removed, Ok([1, 2, 1]));
        assert!(!chunk.is_on(1, 2, 1));
        assert!(Face::ALL.iter().all(|f| face_degenerate(&chunk, [1, 2, 1], *f)));
        // The cell below is now exposed.
        assert!(!face_degenerate(&chunk, [1, 1, 1], Face::Up));

        // Top face of (1, 1, 1), adding lands back in (1, 2, 1).
        let added = chunk.apply_edit_add(&mut library, [1.0, 1.5, 1.0], [0.0, 1.0, 0.0], VoxelType::Grass);
        assert_eq!(added, Ok([1, 2, 1]));
        assert_eq!(chunk.buffers(), &before);
    }

    #[test]
    fn test_skipped_edits_still_commit() {
        let (mut chunk, mut library) = built([2, 2, 2]);
        let before = chunk.buffers().clone();

        let far = chunk.apply_edit_remove(&mut library, [50.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(matches!(far, Err(EditError::OutOfBounds { .. })));

        let same = chunk.apply_edit_add(&mut library, [0.0, 0.5, 0.0], [0.0, -1.0, 0.0], VoxelType::Grass);
        assert_eq!(same, Err(EditError::AlreadyInState { cell: [0, 0, 0] }));

        let nan = chunk.apply_edit_remove(&mut library, [0.0, 0.0, 0.0], [f32::NAN, 0.0, 0.0]);
        assert_eq!(nan, Err(EditError::NonFiniteHit));

        assert_eq!(chunk.buffers(), &before);
        assert_eq!(chunk.commit_count(), 4);
    }

    #[test]
    fn test_remove_on_empty_cell_is_skipped() {
        let (mut chunk, mut library) = built([1, 1, 1]);
        chunk.clear_cell(0, 0, 0);
        let outcome = chunk.apply_edit_remove(&mut library, [0.0, 0.5, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(outcome, Err(EditError::AlreadyInState { cell: [0, 0, 0] }));
    }

    #[test]
    fn test_add_retypes_occupied_cell() {
        let (mut chunk, mut library) = built([1, 2, 1]);
        let outcome = chunk.apply_edit_add(&mut library, [0.0, 0.5, 0.0], [0.0, 1.0, 0.0], VoxelType::Stone);
        assert_eq!(outcome, Ok([0, 1, 0]));
        assert_eq!(chunk.cell(0, 1, 0).voxel_type(), VoxelType::Stone);
    }

    #[test]
    #[should_panic(expected = "outside chunk extent")]
    fn test_set_cell_type_out_of_range_panics() {
        let (mut chunk, _) = built([2, 2, 2]);
        chunk.set_cell_type(0, 2, 0, VoxelType::Dirt);
    }
}
