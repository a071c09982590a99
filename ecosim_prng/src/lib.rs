// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled with zero external RNG dependencies so that a given seed
// produces the same ecosystem on every platform.
//
// This crate is the single PRNG of the workspace. `ecosim_sim` owns one
// `GameRng` per simulation and threads it explicitly into every random
// decision: random-walk directions, genome crossover rolls, mutation deltas,
// and initial genome generation. Nothing in the simulation may reach for
// ambient/global randomness.
//
// The draw helpers mirror the shapes the behavior code needs:
// - `roll_inclusive(low, high)`: a die roll over `[low, high]`.
// - `coin()`: a fair binary choice.
// - `uniform(a, b)`: a float between two bounds given in either order.
// - `one_in(n)`: a 1-in-n chance.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state, regardless of platform, compiler version,
// or optimization level. Floating point only appears when converting a drawn
// integer into an `f64`, never inside the generator itself.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG — the simulation's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1) from the upper 53 bits of a `u64`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Roll a die over `[low, high]`, both ends included.
    ///
    /// Panics if `low > high`.
    pub fn roll_inclusive(&mut self, low: u64, high: u64) -> u64 {
        assert!(low <= high, "roll_inclusive: low must be <= high");
        match high.checked_add(1) {
            Some(end) => self.range_u64(low, end),
            None if low == 0 => self.next_u64(),
            None => low + self.range_u64(0, high - low + 1),
        }
    }

    /// Fair coin flip.
    pub fn coin(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Uniform float between `a` and `b`.
    ///
    /// The bounds may be given in either order; `uniform(3.0, 1.0)` draws
    /// from the same interval as `uniform(1.0, 3.0)`. Equal bounds return
    /// that value.
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_f64()
    }

    /// Return `true` with probability `1 / n`. `n == 0` never fires.
    pub fn one_in(&mut self, n: u64) -> bool {
        n != 0 && self.roll_inclusive(1, n) == 1
    }
}

/// SplitMix64 — used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
