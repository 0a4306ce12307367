//! Test doubles shared by unit and behaviour tests across the workspace.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::Clock;

/// [`Clock`] whose time only moves when told to.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use haven_core::Clock;
/// use haven_core::test_support::ManualClock;
///
/// let clock = ManualClock::at_epoch_secs(1_000);
/// let before = clock.now();
/// clock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now().duration_since(before).unwrap(), Duration::from_secs(90));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Start the clock at `time`.
    #[must_use]
    pub const fn new(time: SystemTime) -> Self {
        Self {
            now: Mutex::new(time),
        }
    }

    /// Start the clock `secs` seconds after the Unix epoch.
    #[must_use]
    pub fn at_epoch_secs(secs: u64) -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }

    /// Jump to an absolute time.
    pub fn set(&self, time: SystemTime) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now = time;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
