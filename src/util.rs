//! Timing helpers for the solver passes.

use std::time::Instant;

/// Guard that logs how long a pass took when it goes out of scope.
///
/// ```ignore
/// let _t = Timed::debug("project");
/// // ... pass ...
/// // logs "project: 12.345ms" at DEBUG
/// ```
pub struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Logs at INFO on drop.
    pub fn info(name: &'static str) -> Self {
        Self::at(name, log::Level::Info)
    }

    /// Logs at DEBUG on drop.
    pub fn debug(name: &'static str) -> Self {
        Self::at(name, log::Level::Debug)
    }

    fn at(name: &'static str, level: log::Level) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
