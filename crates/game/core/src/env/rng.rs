//! Deterministic random number generation.
//!
//! A single [`PcgRng`] stream is seeded once per match and handed by
//! reference to everything that needs randomness: stat rolls during map
//! construction, map generators, and AI evaluation. Two peers (or a replay)
//! that seed the same value and consume the stream in the same order observe
//! identical draws.

/// Source of deterministic random draws.
pub trait RandomSource {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }

    /// Uniform integer in `[min, max]` inclusive.
    fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        (min as i64 + (self.next_u32() as u64 % span) as i64) as i32
    }

    /// Uniform float in `[min, max]`.
    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// True with the given probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a generator from a match seed.
    pub fn seeded(seed: u32) -> Self {
        let mut rng = Self { state: 0 };
        rng.state = Self::pcg_step(rng.state);
        rng.state = rng.state.wrapping_add(u64::from(seed));
        rng.state = Self::pcg_step(rng.state);
        rng
    }

    /// Internal state, exposed for digests.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = PcgRng::seeded(42);
        let mut b = PcgRng::seeded(42);
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = PcgRng::seeded(1);
        let mut b = PcgRng::seeded(2);
        let a_draws: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let b_draws: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(a_draws, b_draws);
    }

    #[test]
    fn ranges_stay_in_bounds() {
        let mut rng = PcgRng::seeded(7);
        for _ in 0..1000 {
            let value = rng.range_i32(-3, 5);
            assert!((-3..=5).contains(&value));
            let unit = rng.next_f32();
            assert!((0.0..1.0).contains(&unit));
            assert!(rng.below(10) < 10);
        }
        assert_eq!(rng.below(0), 0);
        assert_eq!(rng.range_i32(4, 4), 4);
    }

    #[test]
    fn chance_respects_its_probability() {
        let mut rng = PcgRng::seeded(11);
        assert!((0..200).all(|_| !rng.chance(0.0)));
        assert!((0..200).all(|_| rng.chance(1.0)));
        let hits = (0..1000).filter(|_| rng.chance(0.25)).count();
        assert!((180..320).contains(&hits), "hits: {hits}");
    }
}
