//! Core domain types
//!
//! Newtypes keep the two 64-bit fields of a record from being swapped
//! silently, and `Sample` is the immutable decoded form of one record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanosecond-resolution capture time.
///
/// Monotonic per session but not guaranteed strictly increasing across
/// sampled threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

/// Identifier of the sampled execution context (typically a thread id).
///
/// Negative values denote "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub i64);

impl SampleId {
    /// Returns `true` if the id denotes an unknown context.
    #[must_use]
    pub fn is_unknown(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("unknown")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One resolved stack frame: a dot-separated fully-qualified method path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRef {
    pub qualified_name: String,
}

impl FrameRef {
    #[must_use]
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self { qualified_name: qualified_name.into() }
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

/// One decoded stack-trace snapshot.
///
/// Produced by `wire::decode_record` and immutable thereafter. A
/// successfully decoded sample always has at least one frame, leaf first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub sample_id: SampleId,
    /// Name of the sampled context (e.g. thread name). Absent is valid.
    pub label: Option<String>,
    /// Ordered call stack, innermost (leaf) frame first. Never empty.
    pub frames: Vec<FrameRef>,
}

impl Sample {
    /// Label for display; an absent label renders as "unknown" rather
    /// than failing downstream.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("unknown")
    }
}
