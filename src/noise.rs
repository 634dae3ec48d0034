//! Hash-based value noise and its fractal (multi-octave) combination.
//!
//! Both functions are pure: the same `(x, y, seed)` always yields the same value.

/// Number of octaves summed by [`fractal`].
pub const OCTAVES: u32 = 4;

/// Pseudo-random value in `[0, 1)` for an integer lattice point.
pub fn value(x: i32, y: i32, seed: u32) -> f64 {
    let mut h = (x as u32).wrapping_mul(374_761_393);
    h = h.wrapping_add((y as u32).wrapping_mul(668_265_263));
    h ^= seed
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(h << 6)
        .wrapping_add(h >> 2);
    h ^= h >> 17;
    h = h.wrapping_mul(0xed5a_d4bb);
    h ^= h >> 11;
    h = h.wrapping_mul(0xac4c_1b51);
    h ^= h >> 15;
    (h & 0x00ff_ffff) as f64 / 16_777_216.0
}

/// Four-octave sum of [`value`] noise, normalized back into `[0, 1)`.
///
/// Each octave doubles the lattice frequency, halves its weight and offsets the
/// seed so octaves are decorrelated.
pub fn fractal(x: i32, y: i32, seed: u32) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut weight = 0.0;
    for octave in 0..OCTAVES {
        let sx = (x as f64 * frequency) as i32;
        let sy = (y as f64 * frequency) as i32;
        sum += amplitude * value(sx, sy, seed.wrapping_add(octave.wrapping_mul(17)));
        weight += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    sum / weight
}
