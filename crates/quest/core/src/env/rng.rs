//! Seeded randomness for timing jitter.
//!
//! Timing jitter must be reproducible under test, so generators are pure
//! functions of a seed. Stateful draws live in [`crate::jitter::Jitter`], which
//! derives a fresh seed per draw with [`compute_seed`].

/// Deterministic random source keyed by an explicit seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Value in `[min, max]` inclusive. Returns `min` for an empty or inverted range.
    fn range(&self, seed: u64, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        let span = max - min + 1;
        min + (u64::from(self.next_u32(seed)) % span)
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn advance(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::advance(seed))
    }
}

/// Mixes a base seed with a draw counter and a context discriminator.
///
/// `context` separates independent streams that share a base seed, e.g. the
/// tasks of one script.
pub fn compute_seed(base_seed: u64, nonce: u64, context: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x517cc1b727220a95);

    // SplitMix64-style finalizer
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn range_stays_inclusive() {
        let rng = PcgRng;
        for nonce in 0..500 {
            let value = rng.range(compute_seed(7, nonce, 0), 2500, 3100);
            assert!((2500..=3100).contains(&value));
        }
        assert_eq!(rng.range(1, 5, 5), 5);
        assert_eq!(rng.range(1, 9, 3), 9);
    }

    #[test]
    fn contexts_produce_distinct_streams() {
        assert_ne!(compute_seed(1, 0, 0), compute_seed(1, 0, 1));
        assert_ne!(compute_seed(1, 0, 0), compute_seed(1, 1, 0));
    }
}
