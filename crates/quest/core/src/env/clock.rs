/// Wall-clock access for the blocking waits inside a task step.
///
/// The core never sleeps on its own; every suspension goes through
/// [`ClockOracle::sleep_ms`], which lets simulators advance virtual time.
pub trait ClockOracle: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspends the calling step for `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);
}
