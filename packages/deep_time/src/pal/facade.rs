//! Facade over the real and fake platform implementations.

use std::sync::Arc;
use std::time::Duration;

use crate::pal::abstractions::Platform;
#[cfg(test)]
use crate::pal::fake::FakePlatform;
use crate::pal::real::RealPlatform;

/// Dispatches platform calls to either the real clock or a test-controlled
/// fake without making the owning types generic.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(Arc<RealPlatform>),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(Arc::new(RealPlatform::new()))
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}

impl Platform for PlatformFacade {
    fn monotonic_now(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.monotonic_now(),
            #[cfg(test)]
            Self::Fake(platform) => platform.monotonic_now(),
        }
    }
}
