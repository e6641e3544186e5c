//! # Cube Faces
//!
//! The six sides of a voxel cube and the constant tables that drive
//! geometry emission.
//!
//! ## Corner Labels
//!
//! ```text
//!            G-----------H
//!           /|          /|
//!          E-----------F |        +y
//!          | |         | |         |  +z
//!          | C---------|-D         | /
//!          |/          |/          |/
//!          A-----------B           +---- +x
//! ```
//!
//! The 4-corner order of every face is fixed. The triangle fans below
//! index into that order, so changing one without the other flips the
//! winding and the face gets back-face culled by the renderer.

use std::ops::{BitOr, BitOrAssign};

/// One corner of the unit cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// (-, -, -)
    A,
    /// (+, -, -)
    B,
    /// (-, -, +)
    C,
    /// (+, -, +)
    D,
    /// (-, +, -)
    E,
    /// (+, +, -)
    F,
    /// (-, +, +)
    G,
    /// (+, +, +)
    H,
}

impl Corner {
    /// Sign of this corner along x, y and z (each -1 or +1).
    #[inline]
    #[must_use]
    pub const fn signs(self) -> [f32; 3] {
        match self {
            Self::A => [-1.0, -1.0, -1.0],
            Self::B => [1.0, -1.0, -1.0],
            Self::C => [-1.0, -1.0, 1.0],
            Self::D => [1.0, -1.0, 1.0],
            Self::E => [-1.0, 1.0, -1.0],
            Self::F => [1.0, 1.0, -1.0],
            Self::G => [-1.0, 1.0, 1.0],
            Self::H => [1.0, 1.0, 1.0],
        }
    }
}

/// One of the six cube sides.
///
/// The discriminant is the face's ordinal: it picks the face's 4-vertex
/// block and 6-index block inside a cell's slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// -z side (E F A B).
    Back = 0,
    /// +x side (F H B D).
    Right = 1,
    /// +z side (H G D C).
    Forward = 2,
    /// -x side (G E C A).
    Left = 3,
    /// +y side (E F G H).
    Up = 4,
    /// -y side (A B C D).
    Down = 5,
}

/// Corner order per face, indexed by ordinal.
const FACE_CORNERS: [[Corner; 4]; 6] = {
    use Corner::{A, B, C, D, E, F, G, H};
    [
        [E, F, A, B],
        [F, H, B, D],
        [H, G, D, C],
        [G, E, C, A],
        [E, F, G, H],
        [A, B, C, D],
    ]
};

/// Two triangles per face, as slots 0..4 into the face's corner order.
const FACE_FANS: [[u32; 6]; 6] = [
    [2, 0, 1, 3, 2, 1],
    [2, 0, 1, 3, 2, 1],
    [2, 0, 1, 3, 2, 1],
    [2, 0, 1, 3, 2, 1],
    [0, 2, 3, 1, 0, 3],
    [2, 0, 1, 3, 2, 1],
];

/// Lattice step towards the neighbor that shares each face.
const FACE_NEIGHBORS: [[i32; 3]; 6] = [
    [0, 0, -1],
    [1, 0, 0],
    [0, 0, 1],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
];

impl Face {
    /// Number of faces on a cube.
    pub const COUNT: usize = 6;

    /// All faces in ordinal order.
    pub const ALL: [Self; 6] = [
        Self::Back,
        Self::Right,
        Self::Forward,
        Self::Left,
        Self::Up,
        Self::Down,
    ];

    /// Returns the face's ordinal (0..6).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the face with the given ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 6`. Faces are a closed set, so an unknown
    /// ordinal is a bug in the caller.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        assert!(index < Self::COUNT, "face ordinal {index} out of range");
        Self::ALL[index]
    }

    /// Returns this face's bit in a [`FaceMask`].
    #[inline]
    #[must_use]
    pub const fn bit(self) -> FaceMask {
        FaceMask(1 << self as u8)
    }

    /// The four corners of this face, in emission order.
    #[inline]
    #[must_use]
    pub const fn corners(self) -> [Corner; 4] {
        FACE_CORNERS[self as usize]
    }

    /// The 6-entry triangle fan over this face's 4 vertex slots.
    #[inline]
    #[must_use]
    pub const fn fan(self) -> [u32; 6] {
        FACE_FANS[self as usize]
    }

    /// Lattice offset of the neighboring cell across this face.
    #[inline]
    #[must_use]
    pub const fn neighbor_offset(self) -> [i32; 3] {
        FACE_NEIGHBORS[self as usize]
    }

    /// True for the four vertical faces.
    #[inline]
    #[must_use]
    pub const fn is_side(self) -> bool {
        !matches!(self, Self::Up | Self::Down)
    }
}

/// Set of faces, one bit per face (back=1, right=2, forward=4, left=8,
/// up=16, down=32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceMask(u8);

impl FaceMask {
    /// No faces.
    pub const NONE: Self = Self(0);
    /// All six faces.
    pub const ALL: Self = Self(0b11_1111);

    /// Builds a mask from raw bits.
    ///
    /// # Panics
    ///
    /// Panics if any bit above the six face bits is set.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        assert!(bits & !Self::ALL.0 == 0, "face mask {bits:#b} has unknown bits");
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if `face` is in the mask.
    #[inline]
    #[must_use]
    pub const fn contains(self, face: Face) -> bool {
        self.0 & face.bit().0 != 0
    }

    /// True if no face is in the mask.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the faces in the mask, in ordinal order.
    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.contains(*face))
    }
}

impl From<Face> for FaceMask {
    fn from(face: Face) -> Self {
        face.bit()
    }
}

impl BitOr for FaceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Face> for FaceMask {
    type Output = Self;

    fn bitor(self, rhs: Face) -> Self {
        self | rhs.bit()
    }
}

impl BitOrAssign for FaceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
