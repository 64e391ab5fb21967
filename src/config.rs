//! Scheduler configuration.
//!
//! Validation is split out of [`crate::init`] into its own constructor so
//! a bad `(quantum, io_count)` pair never reaches scheduler state in the
//! first place. Values are validated at runtime rather than fixed as
//! compile-time constants, since the embedder supplies them at `init`
//! time.

use crate::error::SchedulerError;
use crate::MAX_EVENTS;

/// A validated `(quantum, io_count)` pair, consumed by [`crate::init`].
///
/// `MAX_PRIO` and `MAX_EVENTS` are not part of `Config`: the embedding
/// contract fixes them as crate constants, and they are never
/// runtime-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub(crate) quantum: u32,
    pub(crate) io_count: usize,
}

impl Config {
    /// Validates `quantum` and `io_count` and builds a `Config`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroQuantum`] if `quantum` is zero, or
    /// [`SchedulerError::TooManyIoDevices`] if `io_count` exceeds
    /// [`crate::MAX_EVENTS`].
    pub fn new(quantum: u32, io_count: usize) -> Result<Self, SchedulerError> {
        if quantum == 0 {
            return Err(SchedulerError::ZeroQuantum);
        }
        if io_count > MAX_EVENTS {
            return Err(SchedulerError::TooManyIoDevices {
                requested: io_count,
                max: MAX_EVENTS,
            });
        }
        Ok(Self { quantum, io_count })
    }

    /// The virtual-time quantum each task is re-armed with.
    #[must_use]
    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    /// The number of valid I/O devices; valid indices are `[0, io_count)`.
    #[must_use]
    pub fn io_count(&self) -> usize {
        self.io_count
    }
}
