//! The player collaborator moved onto the terrain after sculpting.

/// Anything that can be dropped at a world position.
pub trait PlayerAnchor {
    /// Moves the anchor to `position`.
    fn place(&mut self, position: [f32; 3]);
}

impl<F: FnMut([f32; 3])> PlayerAnchor for F {
    fn place(&mut self, position: [f32; 3]) {
        self(position);
    }
}

/// Spawn point above a terrain of `total_extent` voxels: horizontal
/// center, two voxels over the top layer.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn spawn_point(total_extent: [u32; 3]) -> [f32; 3] {
    let [x, y, z] = total_extent;
    [x as f32 / 2.0, (y + 2) as f32, z as f32 / 2.0]
}
