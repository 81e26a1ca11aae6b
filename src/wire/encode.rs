//! Reference encoder
//!
//! Produces canonical v3 records from [`Sample`]s. The native agent has its
//! own encoder; this one exists for the round-trip tests and for the
//! synthetic producer in the demo binary, and is the documented inverse of
//! [`decode_record`](super::decode_record): dots re-encode as the package
//! separator and every frame gets the `L` marker.

use super::{BATCH_DELIMITER, FIELD_SEPARATOR, FRAME_MARKER, FRAME_SEPARATOR, PACKAGE_SEPARATOR};
use crate::domain::Sample;

/// Encodes one sample as a canonical v3 record.
#[must_use]
pub fn encode_sample(sample: &Sample) -> String {
    let mut record = String::new();
    record.push_str(&sample.timestamp.0.to_string());
    record.push(FIELD_SEPARATOR);
    record.push_str(&sample.sample_id.0.to_string());
    record.push(FIELD_SEPARATOR);
    record.push_str(sample.label.as_deref().unwrap_or(""));
    record.push(FIELD_SEPARATOR);
    for (i, frame) in sample.frames.iter().enumerate() {
        if i > 0 {
            record.push(FRAME_SEPARATOR);
        }
        record.push(FRAME_MARKER);
        for c in frame.qualified_name.chars() {
            record.push(if c == '.' { PACKAGE_SEPARATOR } else { c });
        }
    }
    record
}

/// Joins encoded samples into one batch string, the shape a drain call
/// returns. An empty iterator yields the empty "no data yet" batch.
pub fn encode_batch<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> String {
    let records: Vec<String> = samples.into_iter().map(encode_sample).collect();
    records.join(&BATCH_DELIMITER.to_string())
}
