//! Accumulated resolution timings.

use chrono::Duration;
use std::ops::AddAssign;

/// Time spent resolving a product (or, summed up, all products).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingData {
    pub dependencies_resolving: Duration,
    pub export_setup: Duration,
}

impl Default for TimingData {
    fn default() -> Self {
        Self {
            dependencies_resolving: Duration::zero(),
            export_setup: Duration::zero(),
        }
    }
}

impl TimingData {
    pub fn total(&self) -> Duration {
        self.dependencies_resolving + self.export_setup
    }
}

impl AddAssign for TimingData {
    fn add_assign(&mut self, other: Self) {
        self.dependencies_resolving += other.dependencies_resolving;
        self.export_setup += other.export_setup;
    }
}

/// Convert a std elapsed time, saturating instead of failing on overflow.
pub fn from_elapsed(elapsed: std::time::Duration) -> Duration {
    Duration::from_std(elapsed).unwrap_or(Duration::MAX)
}
