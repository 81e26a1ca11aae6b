//! Batch splitting
//!
//! One drain call returns zero or more `#`-separated records as a single
//! string. An empty batch is the normal "nothing buffered right now"
//! signal, not an error and not end-of-stream.

use super::BATCH_DELIMITER;

/// Splits a drained batch into individual encoded records.
///
/// Zero-length fragments are discarded: the native encoder terminates every
/// trace with the delimiter, so a well-formed batch ends with one trailing
/// empty fragment, and leading/doubled delimiters are tolerated the same
/// way. Record order is preserved and matches capture order.
pub fn split_batch(batch: &str) -> impl Iterator<Item = &str> {
    batch.split(BATCH_DELIMITER).filter(|fragment| !fragment.is_empty())
}
