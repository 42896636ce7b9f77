//! Blocking-with-timeout polling.
//!
//! A [`WaitGate`] suspends the calling step through the [`ClockOracle`] while
//! it re-checks a predicate at a fixed cadence. Every wait is bounded, so a
//! step always hands control back to the runner.
use crate::env::ClockOracle;

/// Polls predicates against a clock at a fixed interval.
#[derive(Clone, Copy)]
pub struct WaitGate<'a> {
    clock: &'a dyn ClockOracle,
    poll_interval_ms: u64,
}

impl<'a> WaitGate<'a> {
    pub fn new(clock: &'a dyn ClockOracle, poll_interval_ms: u64) -> Self {
        Self {
            clock,
            poll_interval_ms: poll_interval_ms.max(1),
        }
    }

    /// Waits until `predicate` holds or `timeout_ms` elapses.
    ///
    /// The predicate is checked immediately, after every poll interval and once
    /// more at the deadline. Returns `true` iff it was observed true.
    pub fn wait_until(&self, timeout_ms: u64, mut predicate: impl FnMut() -> bool) -> bool {
        let deadline = self.clock.now_ms().saturating_add(timeout_ms);
        loop {
            if predicate() {
                return true;
            }
            let now = self.clock.now_ms();
            if now >= deadline {
                return false;
            }
            self.clock.sleep_ms(self.poll_interval_ms.min(deadline - now));
        }
    }

    pub fn sleep(&self, ms: u64) {
        self.clock.sleep_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn returns_immediately_when_predicate_holds() {
        let clock = ManualClock::default();
        let gate = WaitGate::new(&clock, 50);

        assert!(gate.wait_until(1000, || true));
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn times_out_at_deadline() {
        let clock = ManualClock::default();
        let gate = WaitGate::new(&clock, 50);
        let mut checks = 0;

        assert!(!gate.wait_until(120, || {
            checks += 1;
            false
        }));
        // 0, 50, 100, 120
        assert_eq!(checks, 4);
        assert_eq!(clock.now_ms(), 120);
    }

    #[test]
    fn observes_predicate_turning_true() {
        let clock = ManualClock::default();
        let gate = WaitGate::new(&clock, 50);

        assert!(gate.wait_until(1000, || clock.now_ms() >= 300));
        assert_eq!(clock.now_ms(), 300);
    }

    #[test]
    fn zero_timeout_checks_once() {
        let clock = ManualClock::default();
        let gate = WaitGate::new(&clock, 50);
        let mut checks = 0;

        assert!(!gate.wait_until(0, || {
            checks += 1;
            false
        }));
        assert_eq!(checks, 1);
    }
}
