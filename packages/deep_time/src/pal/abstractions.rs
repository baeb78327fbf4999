//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides the monotonic clock the profiler reads timestamps from.
///
/// This trait abstracts the underlying time source, allowing for both a real
/// implementation (backed by the operating system's monotonic clock) and a
/// fake implementation whose time is controlled by tests.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the time elapsed since some fixed but arbitrary epoch.
    ///
    /// Values are monotonically non-decreasing and only ever compared or
    /// subtracted; the epoch itself carries no meaning.
    fn monotonic_now(&self) -> Duration;
}
