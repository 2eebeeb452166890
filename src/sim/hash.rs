//! Cheap deterministic hashing for placement decisions
//!
//! Everything that shapes a chunk's layout is derived from these functions,
//! never from an RNG stream, so a coordinate regenerates identically no
//! matter when or in what order it is visited.

/// Hash a (seed, x, z, salt) tuple to 64 well-mixed bits.
///
/// Total over the whole integer domain: all arithmetic wraps.
#[inline]
pub fn cell_hash(seed: u64, x: i32, z: i32, salt: u64) -> u64 {
    let h = (seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_mul(6364136223846793005)
        .wrapping_add((x as i64 as u64).wrapping_mul(2654435761))
        .wrapping_add((z as i64 as u64).wrapping_mul(40503));
    mix64(h)
}

/// Final avalanche step (MurmurHash3 fmix64)
#[inline]
fn mix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

/// Seeded scalar in [0, 1)
#[inline]
pub fn roll(seed: u64, x: i32, z: i32, salt: u64) -> f64 {
    unit(cell_hash(seed, x, z, salt))
}

/// Seeded index in [0, n); `n` must be non-zero
#[inline]
pub fn pick(seed: u64, x: i32, z: i32, salt: u64, n: u64) -> u64 {
    debug_assert!(n > 0);
    (cell_hash(seed, x, z, salt) >> 32) % n.max(1)
}

/// Seeded value in [min, max)
#[inline]
pub fn range(seed: u64, x: i32, z: i32, salt: u64, min: f32, max: f32) -> f32 {
    min + (max - min) * roll(seed, x, z, salt) as f32
}

/// Top 53 bits as a float in [0, 1)
#[inline]
fn unit(h: u64) -> f64 {
    (h >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
