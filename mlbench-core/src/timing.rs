//! Wall-clock measurement of benchmark phases.

use std::time::{Duration, Instant};

use tracing::debug;

/// Measures elapsed wall-clock time from its creation.
///
/// # Examples
/// ```
/// use mlbench_core::Stopwatch;
///
/// let watch = Stopwatch::start();
/// let elapsed = watch.elapsed();
/// assert!(elapsed.as_secs_f64() >= 0.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Starts measuring now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since [`Self::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Runs `f` and returns its result with the wall-clock time it took. Only the
/// closure is timed.
///
/// # Examples
/// ```
/// use mlbench_core::time_phase;
///
/// let (sum, elapsed) = time_phase("sum", || (1..=10).sum::<u32>());
/// assert_eq!(sum, 55);
/// assert!(elapsed.as_nanos() < u128::MAX);
/// ```
pub fn time_phase<F, R>(phase: &'static str, f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let watch = Stopwatch::start();
    let result = f();
    let elapsed = watch.elapsed();
    debug!(phase, seconds = elapsed.as_secs_f64(), "phase finished");
    (result, elapsed)
}
