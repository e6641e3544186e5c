//! # 2-D Simplex Noise
//!
//! Deterministic coherent noise for terrain heightmaps.
//!
//! Given the same [`NoiseSeed`] the generator returns bit-identical
//! samples on every platform: the permutation is shuffled by a fixed
//! xorshift stream and all arithmetic is plain `f64`.

use serde::Deserialize;

/// Seed for a noise generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Wraps a raw seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// The raw seed.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(0x00C0_FFEE_D1A7_0001)
    }
}

/// Fractal layering of several noise frequencies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Octaves {
    /// Number of layers, at least 1.
    pub count: u32,
    /// Amplitude multiplier per layer.
    pub persistence: f64,
    /// Frequency multiplier per layer.
    pub lacunarity: f64,
}

impl Default for Octaves {
    fn default() -> Self {
        Self {
            count: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Unit gradients on the 8 compass directions (diagonals unnormalized).
const GRADIENTS: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [-1.0, 1.0],
    [-1.0, 0.0],
    [-1.0, -1.0],
    [0.0, -1.0],
    [1.0, -1.0],
];

/// (sqrt(3) - 1) / 2
const SKEW: f64 = 0.366_025_403_784_438_6;
/// (3 - sqrt(3)) / 6
const UNSKEW: f64 = 0.211_324_865_405_187_1;
/// Brings the summed corner contributions to roughly [-1, 1].
const OUTPUT_SCALE: f64 = 70.0;

/// 2-D simplex noise generator.
///
/// ```rust
/// use cubeloom_terrain::noise::{NoiseSeed, SimplexNoise};
///
/// let noise = SimplexNoise::new(NoiseSeed::new(7));
/// let value = noise.sample(3.2, -1.5);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct SimplexNoise {
    /// 256 shuffled bytes, repeated once so `perm[i + perm[j]]` never wraps.
    perm: [u8; 512],
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").finish_non_exhaustive()
    }
}

impl SimplexNoise {
    /// Builds the permutation table for `seed`.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);

        // Fisher-Yates driven by xorshift64; a zero state would never move.
        let mut state = seed.value() | 1;
        for i in (1..table.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            #[allow(clippy::cast_possible_truncation)]
            let j = (state % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        let perm = std::array::from_fn(|i| table[i & 255]);
        Self { perm }
    }

    #[inline]
    fn hash(&self, i: i64, j: i64) -> usize {
        // Masking keeps both lookups inside the doubled table.
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let (i, j) = ((i & 255) as usize, (j & 255) as usize);
        usize::from(self.perm[i + usize::from(self.perm[j])])
    }

    /// Noise at `(x, y)`, roughly in `[-1, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * SKEW;
        let i = (x + s).floor() as i64;
        let j = (y + s).floor() as i64;

        let t = (i + j) as f64 * UNSKEW;
        let x0 = x - (i as f64 - t);
        let y0 = y - (j as f64 - t);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1): (i32, i32) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let corners = [
            (x0, y0, self.hash(i, j)),
            (
                x0 - f64::from(i1) + UNSKEW,
                y0 - f64::from(j1) + UNSKEW,
                self.hash(i + i64::from(i1), j + i64::from(j1)),
            ),
            (
                x0 - 1.0 + 2.0 * UNSKEW,
                y0 - 1.0 + 2.0 * UNSKEW,
                self.hash(i + 1, j + 1),
            ),
        ];

        let sum: f64 = corners.iter().map(|&(dx, dy, h)| corner(dx, dy, h)).sum();
        (OUTPUT_SCALE * sum).clamp(-1.0, 1.0)
    }

    /// Sum of `octaves.count` layers, normalized back to roughly `[-1, 1]`.
    #[must_use]
    pub fn fractal(&self, x: f64, y: f64, octaves: Octaves) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;

        for _ in 0..octaves.count.max(1) {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            norm += amplitude;
            amplitude *= octaves.persistence;
            frequency *= octaves.lacunarity;
        }
        total / norm
    }
}

#[inline]
fn corner(dx: f64, dy: f64, hash: usize) -> f64 {
    let falloff = 0.5 - dx * dx - dy * dy;
    if falloff <= 0.0 {
        return 0.0;
    }
    let [gx, gy] = GRADIENTS[hash & 7];
    let f2 = falloff * falloff;
    f2 * f2 * (gx * dx + gy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = SimplexNoise::new(NoiseSeed::new(99));
        let b = SimplexNoise::new(NoiseSeed::new(99));
        for i in 0..200_i32 {
            let (x, y) = (f64::from(i) * 0.37, f64::from(i) * -0.21);
            assert_eq!(a.sample(x, y).to_bits(), b.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_seeds_differ() {
        let a = SimplexNoise::new(NoiseSeed::new(1));
        let b = SimplexNoise::new(NoiseSeed::new(2));
        let differs = (0..50_i32).any(|i| {
            let x = f64::from(i) * 0.73 + 0.1;
            a.sample(x, x * 0.5) != b.sample(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_zero_seed_still_shuffles() {
        let noise = SimplexNoise::new(NoiseSeed::new(0));
        let identity = (0..256).all(|i| usize::from(noise.perm[i]) == i);
        assert!(!identity);
    }

    #[test]
    fn test_range_and_continuity() {
        let noise = SimplexNoise::new(NoiseSeed::default());
        for i in 0..5000_i32 {
            let x = f64::from(i) * 0.11 - 250.0;
            let y = f64::from(i) * 0.07 + 40.0;
            let v = noise.sample(x, y);
            assert!((-1.0..=1.0).contains(&v), "{v} at ({x}, {y})");
            assert!((v - noise.sample(x + 1e-4, y)).abs() < 0.01);
        }
    }

    #[test]
    fn test_fractal_is_normalized() {
        let noise = SimplexNoise::new(NoiseSeed::default());
        for i in 0..500_i32 {
            let v = noise.fractal(f64::from(i) * 0.3, 1.7, Octaves::default());
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
