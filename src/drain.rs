//! Collaborator drain port
//!
//! The native sampling agent is reached through exactly one operation:
//! `drain`, a destructive read that removes and returns everything
//! currently buffered as one batch string. An empty string means "nothing
//! available right now", not end-of-stream.
//!
//! The collaborator handle is passed explicitly into the session instead of
//! living in process-wide state, so sequential sessions can be tested in
//! isolation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::{DrainError, Sample};
use crate::wire::{encode_sample, BATCH_DELIMITER};

/// The drain port of the native collaborator.
///
/// Must be polling-friendly: safe to call repeatedly and quickly, and must
/// not block indefinitely. Draining is destructive, so the protocol is
/// single-consumer; a session takes ownership of its drain.
pub trait BufferDrain: Send {
    /// Removes and returns all currently buffered records as one
    /// `#`-separated batch, or an empty string if none are available.
    ///
    /// # Errors
    /// A [`DrainError`] is fatal to the session observing it.
    fn drain(&mut self) -> Result<String, DrainError>;
}

/// In-memory collaborator used by the demo binary and the tests.
///
/// A producer pushes encoded records through a cloned handle; `drain`
/// concatenates and removes everything buffered, mirroring the native
/// agent's pop-until-empty behavior.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    records: Arc<Mutex<VecDeque<String>>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one already-encoded record.
    pub fn push_record(&self, record: impl Into<String>) {
        self.records
            .lock()
            .expect("shared buffer lock poisoned")
            .push_back(record.into());
    }

    /// Encodes and appends one sample.
    pub fn push_sample(&self, sample: &Sample) {
        self.push_record(encode_sample(sample));
    }

    /// Number of records currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("shared buffer lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferDrain for SharedBuffer {
    fn drain(&mut self) -> Result<String, DrainError> {
        let drained: Vec<String> = {
            let mut records = self.records.lock().expect("shared buffer lock poisoned");
            records.drain(..).collect()
        };
        Ok(drained.join(&BATCH_DELIMITER.to_string()))
    }
}

/// Scripted collaborator: replays a fixed sequence of drain outcomes, then
/// returns empty batches forever. Useful for deterministic tests of the
/// session loop, including collaborator failure on the n-th drain.
#[derive(Debug)]
pub struct ScriptedDrain {
    steps: VecDeque<Result<String, DrainError>>,
}

impl ScriptedDrain {
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = Result<String, DrainError>>) -> Self {
        Self { steps: steps.into_iter().collect() }
    }

    /// Convenience constructor from plain batch strings.
    #[must_use]
    pub fn from_batches(batches: impl IntoIterator<Item = &'static str>) -> Self {
        Self::new(batches.into_iter().map(|b| Ok(b.to_string())))
    }
}

impl BufferDrain for ScriptedDrain {
    fn drain(&mut self) -> Result<String, DrainError> {
        self.steps.pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrameRef, SampleId, Timestamp};

    #[test]
    fn test_shared_buffer_drain_is_destructive() {
        let buffer = SharedBuffer::new();
        buffer.push_record("1,10,main,Lm/foo");
        buffer.push_record("2,11,worker,Lm/bar");
        assert_eq!(buffer.len(), 2);

        let mut drain = buffer.clone();
        let batch = drain.drain().unwrap();
        assert_eq!(batch, "1,10,main,Lm/foo#2,11,worker,Lm/bar");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_shared_buffer_empty_drain_is_empty_string() {
        let mut buffer = SharedBuffer::new();
        assert_eq!(buffer.drain().unwrap(), "");
    }

    #[test]
    fn test_shared_buffer_push_sample_encodes() {
        let buffer = SharedBuffer::new();
        buffer.push_sample(&Sample {
            timestamp: Timestamp(1),
            sample_id: SampleId(10),
            label: Some("main".to_string()),
            frames: vec![FrameRef::new("m.foo")],
        });
        let mut drain = buffer.clone();
        assert_eq!(drain.drain().unwrap(), "1,10,main,Lm/foo");
    }

    #[test]
    fn test_scripted_drain_replays_then_goes_quiet() {
        let mut drain = ScriptedDrain::new(vec![
            Ok("batch-one".to_string()),
            Err(DrainError::new("boom")),
        ]);
        assert_eq!(drain.drain().unwrap(), "batch-one");
        assert!(drain.drain().is_err());
        assert_eq!(drain.drain().unwrap(), "");
        assert_eq!(drain.drain().unwrap(), "");
    }
}
