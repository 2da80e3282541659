//! Seedable Xorshift64 generator used to place the initial sources.
//!
//! Scene construction must be reproducible from `SceneConfig::seed` alone, on
//! every platform, so the generator is pure 64-bit integer arithmetic.

/// Xorshift64 with shifts (13, 7, 17). Same seed, same sequence.
///
/// Seed 0 is a fixed point of the algorithm and is swapped for a non-zero
/// fallback.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a generator. Seed 0 is replaced by a fixed non-zero value.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns it.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform `f64` in `[0, 1)` built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f64` in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// `1.0` or `-1.0` with equal probability.
    pub fn next_sign(&mut self) -> f64 {
        if self.next_u64() >> 63 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Magnitude uniform in `[min, max)` with a random sign.
    ///
    /// Used for velocity components, which may point either way along an axis.
    pub fn next_signed_range(&mut self, min: f64, max: f64) -> f64 {
        let magnitude = self.next_range(min, max);
        magnitude * self.next_sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // Pinned: scene layouts for a given seed depend on this sequence.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_uses_fallback() {
        let mut zero = Xorshift64::new(0);
        let mut fallback = Xorshift64::new(Xorshift64::FALLBACK_SEED);
        assert_ne!(zero.next_u64(), 0);
        for _ in 0..10 {
            assert_eq!(zero.next_u64(), fallback.next_u64());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64::new(2024);
        let mut b = Xorshift64::new(2024);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at index {i}");
        }
    }

    #[test]
    fn next_range_with_empty_range_returns_min() {
        let mut rng = Xorshift64::new(5);
        assert_eq!(rng.next_range(3.0, 3.0), 3.0);
    }

    #[test]
    fn next_sign_produces_both_signs() {
        let mut rng = Xorshift64::new(99);
        let signs: Vec<f64> = (0..200).map(|_| rng.next_sign()).collect();
        assert!(signs.iter().any(|&s| s > 0.0));
        assert!(signs.iter().any(|&s| s < 0.0));
        assert!(signs.iter().all(|&s| s.abs() == 1.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_range_in_bounds(
                seed: u64,
                min in -1e3_f64..1e3,
                width in 1.0_f64..1e6,
            ) {
                let max = min + width;
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }

            #[test]
            fn next_signed_range_magnitude_in_bounds(
                seed: u64,
                min in 0.0_f64..100.0,
                width in 1e-3_f64..100.0,
            ) {
                let max = min + width;
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_signed_range(min, max).abs();
                    prop_assert!(v >= min && v < max, "|v| = {v} outside [{min}, {max})");
                }
            }
        }
    }
}
