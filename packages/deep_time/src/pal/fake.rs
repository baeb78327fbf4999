//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// Time does not pass on its own; tests advance it explicitly, which makes
/// measured durations exact instead of tolerance-based. Multiple clones of the
/// same `FakePlatform` share the same underlying time state.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    now: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a new fake platform with the clock at zero.
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Sets the current time, affecting all clones of this platform.
    ///
    /// # Panics
    ///
    /// Panics if the clock would move backwards; the abstraction promises a
    /// monotonic clock and tests must honor that.
    pub(crate) fn set_time(&self, time: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned");
        assert!(
            time >= *now,
            "fake monotonic clock cannot move backwards ({:?} -> {:?})",
            *now,
            time
        );
        *now = time;
    }

    /// Moves the clock forward by the given amount.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned");
        *now = now
            .checked_add(by)
            .expect("fake clock advanced beyond representable time");
    }
}

impl Platform for FakePlatform {
    fn monotonic_now(&self) -> Duration {
        *self
            .now
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_at_zero() {
        let platform = FakePlatform::new();
        assert_eq!(platform.monotonic_now(), Duration::ZERO);
    }

    #[test]
    fn advance_moves_time_forward() {
        let platform = FakePlatform::new();

        platform.advance(Duration::from_millis(150));
        assert_eq!(platform.monotonic_now(), Duration::from_millis(150));

        platform.advance(Duration::from_millis(50));
        assert_eq!(platform.monotonic_now(), Duration::from_millis(200));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_time(Duration::from_secs(5));
        assert_eq!(platform2.monotonic_now(), Duration::from_secs(5));
    }

    #[test]
    #[should_panic(expected = "cannot move backwards")]
    fn set_time_rejects_backwards_movement() {
        let platform = FakePlatform::new();
        platform.set_time(Duration::from_secs(5));
        platform.set_time(Duration::from_secs(1));
    }
}
