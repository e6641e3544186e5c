//! # Voxel Types and the Texture Atlas
//!
//! Every voxel type maps to three atlas tiles (sides, top, bottom).
//! The atlas is a grid of equally sized tiles; tile `i` lives at
//! column `i % 4`, row `3 - i / 4`, with row 0 at the bottom of the
//! image because UV v grows upward.
//!
//! ```text
//!   row 3 | dirt     grassdirt  grass  water
//!   row 2 | leaf     stone      coal   bark
//!   row 1 | treecut  wood       brick  lava
//!   row 0 | sand     mud        bark2  wood2
//! ```

use serde::Deserialize;

use crate::error::{MeshError, MeshResult};
use crate::face::Face;

/// The kind of material a voxel is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoxelType {
    /// Plain dirt.
    Dirt,
    /// Grass on top, grassy dirt on the sides, dirt below.
    #[default]
    Grass,
    /// Water.
    Water,
    /// Foliage.
    Leaf,
    /// Tree trunk, bark sides and cut rings top and bottom.
    Tree1,
    /// Tree trunk with the second bark variant.
    Tree2,
    /// Stone.
    Stone,
    /// Coal ore.
    Coal,
    /// Wood planks.
    Wood1,
    /// Second wood plank variant.
    Wood2,
    /// Brick.
    Brick,
    /// Lava.
    Lava,
    /// Sand.
    Sand,
    /// Mud.
    Mud,
}

/// One tile of the texture atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureTile {
    /// Dirt.
    Dirt = 0,
    /// Grass-topped dirt, seen from the side.
    GrassDirt = 1,
    /// Grass, seen from above.
    Grass = 2,
    /// Water.
    Water = 3,
    /// Leaf.
    Leaf = 4,
    /// Stone.
    Stone = 5,
    /// Coal.
    Coal = 6,
    /// Bark.
    Bark = 7,
    /// Cut trunk rings.
    TreeCut = 8,
    /// Wood.
    Wood = 9,
    /// Brick.
    Brick = 10,
    /// Lava.
    Lava = 11,
    /// Sand.
    Sand = 12,
    /// Mud.
    Mud = 13,
    /// Second bark.
    Bark2 = 14,
    /// Second wood.
    Wood2 = 15,
}

/// Tiles used by a voxel type, grouped by face orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceTiles {
    /// Back, right, forward and left faces.
    pub side: TextureTile,
    /// Up face.
    pub top: TextureTile,
    /// Down face.
    pub bottom: TextureTile,
}

impl FaceTiles {
    const fn uniform(tile: TextureTile) -> Self {
        Self { side: tile, top: tile, bottom: tile }
    }

    /// Returns the tile drawn on `face`.
    #[inline]
    #[must_use]
    pub const fn for_face(self, face: Face) -> TextureTile {
        match face {
            Face::Up => self.top,
            Face::Down => self.bottom,
            Face::Back | Face::Right | Face::Forward | Face::Left => self.side,
        }
    }
}

/// Tiles per voxel type, indexed by `VoxelType` ordinal.
const TYPE_TILES: [FaceTiles; VoxelType::COUNT] = {
    use TextureTile as T;
    [
        FaceTiles::uniform(T::Dirt),
        FaceTiles { side: T::GrassDirt, top: T::Grass, bottom: T::Dirt },
        FaceTiles::uniform(T::Water),
        FaceTiles::uniform(T::Leaf),
        FaceTiles { side: T::Bark, top: T::TreeCut, bottom: T::TreeCut },
        FaceTiles { side: T::Bark2, top: T::TreeCut, bottom: T::TreeCut },
        FaceTiles::uniform(T::Stone),
        FaceTiles::uniform(T::Coal),
        FaceTiles::uniform(T::Wood),
        FaceTiles::uniform(T::Wood2),
        FaceTiles::uniform(T::Brick),
        FaceTiles::uniform(T::Lava),
        FaceTiles::uniform(T::Sand),
        FaceTiles::uniform(T::Mud),
    ]
};

impl VoxelType {
    /// Number of voxel types.
    pub const COUNT: usize = 14;

    /// All voxel types in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Dirt,
        Self::Grass,
        Self::Water,
        Self::Leaf,
        Self::Tree1,
        Self::Tree2,
        Self::Stone,
        Self::Coal,
        Self::Wood1,
        Self::Wood2,
        Self::Brick,
        Self::Lava,
        Self::Sand,
        Self::Mud,
    ];

    /// Returns the atlas tiles for this type.
    #[inline]
    #[must_use]
    pub const fn tiles(self) -> FaceTiles {
        TYPE_TILES[self as usize]
    }
}

impl TextureTile {
    /// Atlas column and row of this tile.
    #[inline]
    #[must_use]
    pub const fn grid_position(self) -> (u32, u32) {
        let i = self as u32;
        (i % 4, 3 - i / 4)
    }
}

/// Normalized UV rectangle of one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    /// Lower-left corner.
    pub lo: [f32; 2],
    /// Upper-right corner.
    pub hi: [f32; 2],
}

impl UvRect {
    /// The four UVs for `face`, matching the face's corner order.
    ///
    /// Side and down faces list their top edge first; the up face lists
    /// its far (-z) edge at v = lo.
    #[must_use]
    pub const fn corners_for(self, face: Face) -> [[f32; 2]; 4] {
        let Self { lo, hi } = self;
        match face {
            Face::Up => [[lo[0], lo[1]], [hi[0], lo[1]], [lo[0], hi[1]], [hi[0], hi[1]]],
            Face::Back | Face::Right | Face::Forward | Face::Left | Face::Down => {
                [[lo[0], hi[1]], [hi[0], hi[1]], [lo[0], lo[1]], [hi[0], lo[1]]]
            }
        }
    }
}

/// Shape of the texture atlas image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AtlasLayout {
    /// Tiles per row.
    pub columns: u32,
    /// Tiles per column.
    pub rows: u32,
    /// Tile width in pixels.
    pub tile_width_px: u32,
    /// Tile height in pixels.
    pub tile_height_px: u32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            tile_width_px: 128,
            tile_height_px: 128,
        }
    }
}

impl AtlasLayout {
    /// Checks that the atlas can hold the 4x4 tile set.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::AtlasTooSmall`] if it cannot, or
    /// [`MeshError::AtlasTooLarge`] if its pixel size overflows `u32`.
    pub fn validate(&self) -> MeshResult<()> {
        if self.columns < 4 || self.rows < 4 || self.tile_width_px == 0 || self.tile_height_px == 0 {
            return Err(MeshError::AtlasTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        for (axis, tiles, tile_px) in [
            ("width", self.columns, self.tile_width_px),
            ("height", self.rows, self.tile_height_px),
        ] {
            if tiles.checked_mul(tile_px).is_none() {
                return Err(MeshError::AtlasTooLarge { axis, tiles, tile_px });
            }
        }
        Ok(())
    }

    /// Normalized UV rectangle covering `tile`.
    #[must_use]
    pub fn uv_rect(&self, tile: TextureTile) -> UvRect {
        let (column, row) = tile.grid_position();
        let width = (self.columns * self.tile_width_px) as f32;
        let height = (self.rows * self.tile_height_px) as f32;

        let lo_x = (column * self.tile_width_px) as f32;
        let lo_y = (row * self.tile_height_px) as f32;
        UvRect {
            lo: [lo_x / width, lo_y / height],
            hi: [(lo_x + self.tile_width_px as f32) / width, (lo_y + self.tile_height_px as f32) / height],
        }
    }
}
