//! # Renderer / Collider Boundary
//!
//! After every commit a chunk lends its three buffers to a [`MeshSink`].
//! Uploading to the GPU, rebuilding collision shapes and recomputing
//! bounds and normals are the sink's business, not the chunk's.
//!
//! [`MeshLibrary`] is the in-process sink: it keeps an owned
//! [`UploadedMesh`] per chunk with bounds and normals recomputed the way
//! an engine would after a mesh upload.

use std::collections::HashMap;

/// Borrowed view of one chunk's committed buffers.
#[derive(Clone, Copy, Debug)]
pub struct ChunkMeshView<'a> {
    /// World position of the chunk's lattice origin.
    pub origin: [i32; 3],
    /// Vertex positions, chunk-local.
    pub positions: &'a [[f32; 3]],
    /// Texture coordinates, one per vertex.
    pub uvs: &'a [[f32; 2]],
    /// Triangle indices, three per triangle.
    pub indices: &'a [u32],
}

impl<'a> ChunkMeshView<'a> {
    /// Positions as raw bytes for a vertex buffer upload.
    #[must_use]
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    /// UVs as raw bytes.
    #[must_use]
    pub fn uv_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.uvs)
    }

    /// Indices as raw bytes for an index buffer upload.
    #[must_use]
    pub fn index_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.indices)
    }

    /// Iterates triangles that cover a non-zero index span.
    pub fn visible_triangles(&self) -> impl Iterator<Item = [u32; 3]> + 'a {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .filter(|[a, b, c]| !(a == b && b == c))
    }
}

/// Receives committed chunk meshes.
pub trait MeshSink {
    /// Called once per `Chunk::commit`, after culling.
    fn publish(&mut self, view: &ChunkMeshView<'_>);
}

impl<F> MeshSink for F
where
    F: FnMut(&ChunkMeshView<'_>),
{
    fn publish(&mut self, view: &ChunkMeshView<'_>) {
        self(view);
    }
}

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

/// Owned copy of a published mesh plus derived geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedMesh {
    /// Chunk world position.
    pub origin: [i32; 3],
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Unit per-vertex normals; zero for vertices no visible triangle uses.
    pub normals: Vec<[f32; 3]>,
    /// Box around visible geometry, `None` if nothing is visible.
    pub bounds: Option<Bounds>,
}

impl UploadedMesh {
    /// Copies `view` and derives bounds and normals.
    #[must_use]
    pub fn from_view(view: &ChunkMeshView<'_>) -> Self {
        let mut normals = vec![[0.0_f32; 3]; view.positions.len()];
        let mut bounds: Option<Bounds> = None;

        for tri in view.visible_triangles() {
            let [a, b, c] = tri.map(|i| view.positions[i as usize]);
            let u = sub(b, a);
            let v = sub(c, a);
            // Area-weighted: the cross product's length is twice the area.
            let face_normal = cross(u, v);

            for (index, position) in tri.iter().zip([a, b, c]) {
                let n = &mut normals[*index as usize];
                for (acc, part) in n.iter_mut().zip(face_normal) {
                    *acc += part;
                }
                bounds = Some(match bounds {
                    None => Bounds { min: position, max: position },
                    Some(Bounds { min, max }) => Bounds {
                        min: [min[0].min(position[0]), min[1].min(position[1]), min[2].min(position[2])],
                        max: [max[0].max(position[0]), max[1].max(position[1]), max[2].max(position[2])],
                    },
                });
            }
        }

        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > f32::EPSILON {
                *n = [n[0] / len, n[1] / len, n[2] / len];
            }
        }

        Self {
            origin: view.origin,
            positions: view.positions.to_vec(),
            uvs: view.uvs.to_vec(),
            indices: view.indices.to_vec(),
            normals,
            bounds,
        }
    }

    /// Number of triangles that draw something.
    #[must_use]
    pub fn visible_triangle_count(&self) -> usize {
        self.view().visible_triangles().count()
    }

    /// Borrows this mesh back as a view.
    #[must_use]
    pub fn view(&self) -> ChunkMeshView<'_> {
        ChunkMeshView {
            origin: self.origin,
            positions: &self.positions,
            uvs: &self.uvs,
            indices: &self.indices,
        }
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(u: [f32; 3], v: [f32; 3]) -> [f32; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

/// Sink that keeps the latest mesh of every chunk it has seen.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: HashMap<[i32; 3], UploadedMesh>,
    publish_count: u64,
}

impl MeshLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest mesh published by the chunk at `origin`.
    #[must_use]
    pub fn get(&self, origin: [i32; 3]) -> Option<&UploadedMesh> {
        self.meshes.get(&origin)
    }

    /// Number of distinct chunks seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True if nothing was ever published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total publishes received, across all chunks.
    #[must_use]
    pub const fn publish_count(&self) -> u64 {
        self.publish_count
    }

    /// Iterates the stored meshes in no particular order.
    pub fn meshes(&self) -> impl Iterator<Item = &UploadedMesh> {
        self.meshes.values()
    }
}

impl MeshSink for MeshLibrary {
    fn publish(&mut self, view: &ChunkMeshView<'_>) {
        self.publish_count += 1;
        self.meshes.insert(view.origin, UploadedMesh::from_view(view));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One upward-facing quad at y = 1.
    fn quad_view() -> (Vec<[f32; 3]>, Vec<[f32; 2]>, Vec<u32>) {
        let positions = vec![[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [5.0, 5.0, 5.0]];
        let uvs = vec![[0.0, 0.0]; 5];
        // E G H, F E H from the up-face fan, then a degenerate triangle.
        let indices = vec![0, 2, 3, 1, 0, 3, 4, 4, 4];
        (positions, uvs, indices)
    }

    #[test]
    fn test_degenerate_triangles_are_skipped() {
        let (positions, uvs, indices) = quad_view();
        let view = ChunkMeshView { origin: [0, 0, 0], positions: &positions, uvs: &uvs, indices: &indices };
        assert_eq!(view.visible_triangles().count(), 2);
    }

    #[test]
    fn test_bounds_and_normals() {
        let (positions, uvs, indices) = quad_view();
        let view = ChunkMeshView { origin: [0, 0, 0], positions: &positions, uvs: &uvs, indices: &indices };
        let mesh = UploadedMesh::from_view(&view);

        let bounds = mesh.bounds.unwrap();
        assert_eq!(bounds.min, [0.0, 1.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 1.0]);

        for n in &mesh.normals[..4] {
            assert!((n[1] - 1.0).abs() < 1e-6, "normal {n:?} should point up");
        }
        assert_eq!(mesh.normals[4], [0.0, 0.0, 0.0]);
        assert_eq!(mesh.visible_triangle_count(), 2);
    }

    #[test]
    fn test_byte_views() {
        let (positions, uvs, indices) = quad_view();
        let view = ChunkMeshView { origin: [0, 0, 0], positions: &positions, uvs: &uvs, indices: &indices };
        assert_eq!(view.position_bytes().len(), 5 * 12);
        assert_eq!(view.uv_bytes().len(), 5 * 8);
        assert_eq!(view.index_bytes().len(), 9 * 4);
    }

    #[test]
    fn test_library_keeps_latest_per_origin() {
        let (positions, uvs, indices) = quad_view();
        let mut library = MeshLibrary::new();
        for origin in [[0, 0, 0], [10, 0, 0], [0, 0, 0]] {
            library.publish(&ChunkMeshView { origin, positions: &positions, uvs: &uvs, indices: &indices });
        }
        assert_eq!(library.len(), 2);
        assert_eq!(library.publish_count(), 3);
        assert!(library.get([10, 0, 0]).is_some());
    }

    #[test]
    fn test_closure_sink() {
        let (positions, uvs, indices) = quad_view();
        let mut seen = Vec::new();
        let mut sink = |view: &ChunkMeshView<'_>| seen.push(view.origin);
        sink.publish(&ChunkMeshView { origin: [1, 2, 3], positions: &positions, uvs: &uvs, indices: &indices });
        assert_eq!(seen, vec![[1, 2, 3]]);
    }
}
