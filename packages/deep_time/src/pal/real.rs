//! Real platform implementation backed by the operating system clock.

use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// Monotonic clock anchored to an [`Instant`] captured at construction.
///
/// The anchor is the "arbitrary epoch" of the abstraction; all timestamps from
/// one platform instance share it, which is all the profiler needs since it
/// only ever subtracts timestamps.
#[derive(Debug)]
pub(crate) struct RealPlatform {
    epoch: Instant,
}

impl RealPlatform {
    pub(crate) fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Platform for RealPlatform {
    fn monotonic_now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_monotonic() {
        let platform = RealPlatform::new();

        let first = platform.monotonic_now();
        let second = platform.monotonic_now();

        assert!(second >= first);
    }

    #[test]
    fn fresh_platform_starts_near_zero() {
        let platform = RealPlatform::new();
        assert!(platform.monotonic_now() < Duration::from_secs(1));
    }
}
