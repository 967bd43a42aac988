// File: stresskit/src/orchestrator/clock.rs
//
// Clock Abstraction
//
// Time-dependent harness code (duration-bounded load runs, per-run timing)
// reads time through this trait so tests can control time progression
// instead of depending on the wall clock.

use std::future::Future;
use std::pin::Pin;
use tokio::time::{self, Duration, Instant};

/// Clock abstraction used by the load driver and workers.
///
/// Production code uses [`SystemClock`]; tests use [`PausedClock`] so that
/// duration-bounded runs complete instantly and deterministically.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tokio::time::Duration;
/// use stresskit::orchestrator::clock::{Clock, PausedClock};
///
/// #[tokio::test]
/// async fn test_deadline() {
///     let clock = Arc::new(PausedClock::new());
///     let deadline = clock.now() + Duration::from_millis(100);
///
///     clock.advance(Duration::from_millis(150)).await;
///     assert!(clock.now() >= deadline);
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    ///
    /// [`SystemClock`] returns real wall-clock time; [`PausedClock`] returns
    /// the simulated time, which only moves via explicit advancement.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    ///
    /// Under [`PausedClock`] this cooperates with `tokio::time::pause()` so
    /// no real waiting happens.
    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real system clock backed by tokio's time functions.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        time::Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

/// Paused clock for deterministic tests.
///
/// Works with tokio's `time::pause()` mechanism: time only advances when
/// explicitly told to via [`PausedClock::advance`] or when the paused
/// runtime auto-advances past pending sleeps, so a duration-bounded load
/// run can be driven through its whole lifetime without real delays.
pub struct PausedClock;

impl PausedClock {
    /// Creates a new `PausedClock` and pauses tokio time.
    ///
    /// Requires a `current_thread` runtime (a plain `#[tokio::test]`) with
    /// time not yet paused; `time::pause()` panics otherwise.
    pub fn new() -> Self {
        time::pause();
        Self
    }

    /// Manually advance time by the specified duration.
    ///
    /// Pending `sleep()` futures that expire during the advancement are
    /// woken up.
    pub async fn advance(&self, d: Duration) {
        time::advance(d).await
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        // Simulated time; only moves via advance()
        time::Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        Self::new()
    }
}
