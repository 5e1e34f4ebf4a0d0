//! Run RNG
//!
//! Xorshift128+ seeded through SplitMix64. The only consumer is gap
//! placement, so the public surface is the raw stream plus the gap draw.

use serde::{Serialize, Deserialize};

const SPLITMIX_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seeded generator owned by a run.
///
/// A seed plus an input recording fully reproduces a session, resets
/// included, because reset keeps drawing from the same stream.
///
/// ```
/// use flappy::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.gap_start(800, 125), b.gap_start(800, 125));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    lo: u64,
    hi: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Expand a 64-bit seed into the two state words.
    pub fn new(seed: u64) -> Self {
        let first = seed.wrapping_add(SPLITMIX_GAMMA);
        let second = first.wrapping_add(SPLITMIX_GAMMA);
        let (lo, hi) = (mix(first), mix(second));

        // All-zero state is a fixed point of xorshift
        if (lo | hi) == 0 {
            return Self { lo: 1, hi: 1 };
        }
        Self { lo, hi }
    }

    /// Next raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let (s0, s1) = (self.lo, self.hi);
        let out = s0.wrapping_add(s1);

        let t = s1 ^ s0;
        self.lo = s0.rotate_left(24) ^ t ^ (t << 16);
        self.hi = t.rotate_left(37);

        out
    }

    /// Top of the gap for the next obstacle pair, drawn from
    /// `[0, world_height - gap_height)`.
    ///
    /// Returns 0 without consuming the stream when the gap leaves no room.
    pub fn gap_start(&mut self, world_height: i32, gap_height: i32) -> i32 {
        let span = world_height.saturating_sub(gap_height);
        if span <= 0 {
            return 0;
        }
        (self.next_u64() % span as u64) as i32
    }

    /// State words, for hashing.
    pub fn state(&self) -> [u64; 2] {
        [self.lo, self.hi]
    }
}

#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
