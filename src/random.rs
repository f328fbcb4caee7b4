//! Random number generation for ray tracing.
//!
//! Provides thread-local ChaCha20 sampling behind free functions, plus the
//! two rejection samplers the scattering model is built on. Each worker
//! thread owns its own generator; [`reseed`] repositions the calling
//! thread's stream so sample sequences can be pinned for reproducible
//! renders.

use std::cell::RefCell;

use glam::DVec3;
use rand::{rng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

thread_local! {
    /// Thread-local ChaCha20 PRNG for quality random numbers.
    static RNG: RefCell<ChaCha20Rng> = RefCell::new(ChaCha20Rng::from_rng(&mut rng()));
}

/// Reset the calling thread's generator to a deterministic stream.
///
/// The renderer derives one seed per image row, which makes the per-pixel
/// sample sequences independent of how rows are distributed over workers.
pub fn reseed(seed: u64) {
    RNG.with(|rng| *rng.borrow_mut() = ChaCha20Rng::seed_from_u64(seed));
}

/// Generate a random f64 in [0.0, 1.0)
pub fn random_f64() -> f64 {
    RNG.with(|rng| rng.borrow_mut().random())
}

/// Generate a random f64 in [min, max)
pub fn random_f64_range(min: f64, max: f64) -> f64 {
    min + (max - min) * random_f64()
}

/// Random point strictly inside the unit ball, by rejection sampling.
///
/// Draws uniformly from the cube [-1, 1]^3 until the sample lands inside the
/// ball. The result is intentionally NOT normalized; metallic fuzz relies on
/// the interior distribution.
pub fn random_in_unit_sphere() -> DVec3 {
    loop {
        let p = DVec3::new(
            random_f64_range(-1.0, 1.0),
            random_f64_range(-1.0, 1.0),
            random_f64_range(-1.0, 1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Random unit vector: a rejection sample from the unit ball, normalized.
///
/// Distinct from [`random_in_unit_sphere`] on purpose; diffuse scattering's
/// cosine weighting depends on the normalization.
pub fn random_unit_vector() -> DVec3 {
    random_in_unit_sphere().normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_f64_stays_in_unit_range() {
        reseed(1);
        for _ in 0..1000 {
            let x = random_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn reseeding_reproduces_the_stream() {
        reseed(42);
        let a: Vec<f64> = (0..16).map(|_| random_f64()).collect();
        reseed(42);
        let b: Vec<f64> = (0..16).map(|_| random_f64()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_seeds_give_distinct_streams() {
        reseed(1);
        let a: Vec<f64> = (0..8).map(|_| random_f64()).collect();
        reseed(2);
        let b: Vec<f64> = (0..8).map(|_| random_f64()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn unit_sphere_samples_are_interior() {
        reseed(3);
        for _ in 0..500 {
            let p = random_in_unit_sphere();
            assert!(p.length_squared() < 1.0);
        }
    }

    #[test]
    fn unit_vectors_have_unit_length() {
        reseed(4);
        for _ in 0..500 {
            let v = random_unit_vector();
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }
}
