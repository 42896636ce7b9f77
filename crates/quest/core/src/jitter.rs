//! Randomized timing bounds for waits.
//!
//! Waits use jittered timeouts instead of fixed constants so the bot's rhythm
//! is not periodic and host latency spikes are absorbed. Ranges are plain data
//! ([`TimingRange`]) and every draw comes from a seeded [`Jitter`] stream.
use crate::env::{PcgRng, RngOracle, compute_seed};

/// Inclusive millisecond range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl TimingRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn midpoint(&self) -> u64 {
        self.min_ms + (self.max_ms.saturating_sub(self.min_ms)) / 2
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.min_ms..=self.max_ms).contains(&value)
    }
}

/// Seeded stream of timing draws.
///
/// Each draw consumes one nonce, so two streams with the same seed and
/// context replay identical timeouts.
#[derive(Clone, Debug)]
pub struct Jitter<R: RngOracle = PcgRng> {
    rng: R,
    seed: u64,
    context: u32,
    nonce: u64,
}

impl Jitter<PcgRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(PcgRng, seed, 0)
    }
}

impl<R: RngOracle> Jitter<R> {
    pub fn with_rng(rng: R, seed: u64, context: u32) -> Self {
        Self {
            rng,
            seed,
            context,
            nonce: 0,
        }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> u64 {
        self.nonce
    }

    /// Uniform draw in `range`.
    pub fn uniform(&mut self, range: TimingRange) -> u64 {
        let seed = self.next_seed();
        self.rng.range(seed, range.min_ms, range.max_ms)
    }

    /// Bell-shaped draw centred on the midpoint of `range` and bounded by it.
    ///
    /// Mean of three uniform draws (Irwin-Hall), which keeps the result inside
    /// the range while concentrating it around the centre.
    pub fn normal(&mut self, range: TimingRange) -> u64 {
        let total: u64 = (0..3).map(|_| self.uniform(range)).sum();
        total / 3
    }

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(self.seed, self.nonce, self.context);
        self.nonce += 1;
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_draws_stay_in_range() {
        let mut jitter = Jitter::seeded(11);
        let range = TimingRange::new(800, 1400);
        for _ in 0..200 {
            assert!(range.contains(jitter.uniform(range)));
        }
        assert_eq!(jitter.draws(), 200);
    }

    #[test]
    fn normal_draws_cluster_around_midpoint() {
        let mut jitter = Jitter::seeded(3);
        let range = TimingRange::new(1900, 2800);
        let samples: Vec<u64> = (0..300).map(|_| jitter.normal(range)).collect();
        assert!(samples.iter().all(|&value| range.contains(value)));

        let mean = samples.iter().sum::<u64>() / samples.len() as u64;
        assert!(mean.abs_diff(range.midpoint()) < 120, "mean {mean}");
    }

    #[test]
    fn identical_seeds_replay() {
        let range = TimingRange::new(1300, 1900);
        let mut a = Jitter::seeded(99);
        let mut b = Jitter::seeded(99);
        for _ in 0..20 {
            assert_eq!(a.uniform(range), b.uniform(range));
        }
    }
}
