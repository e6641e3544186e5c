//! Column height sources for terrain sculpting.

use crate::noise::{NoiseSeed, Octaves, SimplexNoise};

/// A 2-D field of heights in `[0, 1]`.
///
/// `u` and `v` are the column's normalized terrain coordinates already
/// scaled by the hill amplitude.
pub trait HeightField {
    /// Height at `(u, v)`, in `[0, 1]`.
    fn sample(&self, u: f64, v: f64) -> f64;
}

/// Simplex noise remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SimplexHeightField {
    noise: SimplexNoise,
    octaves: Octaves,
}

impl SimplexHeightField {
    /// Single-octave field for `seed`.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        Self::with_octaves(seed, Octaves { count: 1, ..Octaves::default() })
    }

    /// Fractal field for `seed`.
    #[must_use]
    pub fn with_octaves(seed: NoiseSeed, octaves: Octaves) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            octaves,
        }
    }
}

impl HeightField for SimplexHeightField {
    fn sample(&self, u: f64, v: f64) -> f64 {
        let n = self.noise.fractal(u, v, self.octaves);
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// The same height everywhere. Out-of-range values are clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantHeight(pub f64);

impl HeightField for ConstantHeight {
    fn sample(&self, _u: f64, _v: f64) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

impl<F: Fn(f64, f64) -> f64> HeightField for F {
    fn sample(&self, u: f64, v: f64) -> f64 {
        self(u, v).clamp(0.0, 1.0)
    }
}
