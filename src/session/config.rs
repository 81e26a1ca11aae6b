//! Session configuration
//!
//! Validated up front: a bad poll interval or halt bound is rejected before
//! any worker thread is spawned.

use std::time::Duration;

use crate::domain::SessionError;

/// Default backoff between drains. Short enough to bound latency, long
/// enough not to spin.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Largest accepted poll interval; anything slower than the observed
/// one-second batch cadence is almost certainly a unit mistake.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Optional bound on a session's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltAfter {
    /// Stop once the session has been running this long.
    Duration(Duration),
    /// Stop once this many samples have been decoded.
    Samples(u64),
    /// Stop once this many drains came back empty (total, not consecutive).
    EmptyBatches(u64),
}

/// Configuration for one sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backoff between drains. Zero means busy-poll: supported for
    /// maximum-throughput benchmarking, not the default.
    pub poll_interval: Duration,
    /// Optional run bound; `None` polls until `stop()`.
    pub halt_after: Option<HaltAfter>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, halt_after: None }
    }
}

impl SessionConfig {
    /// Checks the configuration before a worker is spawned.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfiguration`] for a poll interval
    /// above [`MAX_POLL_INTERVAL`] or a zero halt bound.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(SessionError::InvalidConfiguration(format!(
                "poll interval {:?} exceeds maximum {MAX_POLL_INTERVAL:?}",
                self.poll_interval
            )));
        }
        match self.halt_after {
            Some(HaltAfter::Samples(0)) => Err(SessionError::InvalidConfiguration(
                "halt bound of zero samples would never start".to_string(),
            )),
            Some(HaltAfter::EmptyBatches(0)) => Err(SessionError::InvalidConfiguration(
                "halt bound of zero empty batches would never start".to_string(),
            )),
            Some(HaltAfter::Duration(d)) if d.is_zero() => Err(
                SessionError::InvalidConfiguration("halt duration must be nonzero".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
