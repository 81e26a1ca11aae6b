//! JSON sample dump
//!
//! Document shape:
//!
//! ```json
//! {
//!   "format": "stackdrain-sample-dump-v1",
//!   "records": 2,
//!   "decodeFailures": 0,
//!   "elapsedMs": 12.5,
//!   "throughputPerMs": 0.16,
//!   "samples": [
//!     { "timestamp": 1, "sample_id": 10, "label": "main",
//!       "frames": [{ "qualified_name": "m.foo" }] }
//!   ]
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::domain::ExportError;
use crate::session::SessionResult;

/// Identifies the dump format; bump on incompatible changes.
pub const DUMP_FORMAT: &str = "stackdrain-sample-dump-v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpDocument<'a> {
    format: &'static str,
    records: u64,
    decode_failures: u64,
    elapsed_ms: f64,
    throughput_per_ms: f64,
    samples: &'a [crate::domain::Sample],
}

/// Serializes one finished session to the JSON dump format.
pub struct SampleDumpExporter<'a> {
    result: &'a SessionResult,
}

impl<'a> SampleDumpExporter<'a> {
    #[must_use]
    pub fn new(result: &'a SessionResult) -> Self {
        Self { result }
    }

    /// Writes the dump document to `writer`.
    ///
    /// # Errors
    /// Returns [`ExportError`] on serialization or I/O failure.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let document = DumpDocument {
            format: DUMP_FORMAT,
            records: self.result.records,
            decode_failures: self.result.decode_failures,
            elapsed_ms: self.result.elapsed.as_secs_f64() * 1000.0,
            throughput_per_ms: self.result.throughput_per_ms,
            samples: &self.result.samples,
        };
        serde_json::to_writer_pretty(writer, &document)?;
        Ok(())
    }
}
