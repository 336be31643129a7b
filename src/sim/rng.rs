//! Random draws shared by the generators
//!
//! Everything takes `&mut impl Rng` so the session can run on OS entropy in
//! play and on a fixed-seed `Pcg32` in tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Session RNG seeded from the thread RNG (unseeded play)
pub fn entropy_rng() -> Pcg32 {
    Pcg32::from_rng(&mut rand::rng())
}

/// Session RNG with a fixed seed
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Uniform float in [0, 1)
#[inline]
pub fn unit(rng: &mut impl Rng) -> f32 {
    rng.random::<f32>()
}

/// Uniform float in [lo, hi)
#[inline]
pub fn range(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * unit(rng)
}

/// Uniform index in [0, len)
#[inline]
pub fn index(rng: &mut impl Rng, len: usize) -> usize {
    rng.random_range(0..len)
}

/// True with probability `p`
#[inline]
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Uniformly pick one element of a non-empty slice
pub fn pick<T: Copy>(rng: &mut impl Rng, items: &[T]) -> T {
    items[index(rng, items.len())]
}

/// Shuffle a slice in place
pub fn shuffle<T>(rng: &mut impl Rng, items: &mut [T]) {
    items.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        let mut rng = seeded_rng(3);
        for _ in 0..1000 {
            let v = range(&mut rng, 35.0, 55.0);
            assert!((35.0..55.0).contains(&v));
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = seeded_rng(11);
        let mut lanes = [0usize, 1, 2];
        shuffle(&mut rng, &mut lanes);
        let mut sorted = lanes;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2]);
    }

    #[test]
    fn test_seeded_rng_repeats() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..16 {
            assert_eq!(index(&mut a, 100), index(&mut b, 100));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = seeded_rng(5);
        assert!(!chance(&mut rng, 0.0));
        assert!(chance(&mut rng, 1.0));
    }
}
