/// Monotonic attempt counter with a hard ceiling.
///
/// The count never decreases and never passes the ceiling; callers check
/// [`AttemptCounter::is_exhausted`] before recording another attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttemptCounter {
    count: u32,
    ceiling: u32,
}

impl AttemptCounter {
    pub const fn new(ceiling: u32) -> Self {
        Self { count: 0, ceiling }
    }

    pub const fn count(&self) -> u32 {
        self.count
    }

    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub const fn is_exhausted(&self) -> bool {
        self.count >= self.ceiling
    }

    /// Records one attempt. Returns `false` (and leaves the count alone) if the
    /// ceiling was already reached.
    pub fn record(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_ceiling() {
        let mut counter = AttemptCounter::new(3);
        assert!(counter.record());
        assert!(counter.record());
        assert!(!counter.is_exhausted());
        assert!(counter.record());
        assert!(counter.is_exhausted());
        assert!(!counter.record());
        assert_eq!(counter.count(), 3);
    }

    #[test]
    fn zero_ceiling_is_exhausted_from_start() {
        let counter = AttemptCounter::new(0);
        assert!(counter.is_exhausted());
    }
}
