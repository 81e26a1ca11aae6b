//! Canonical wire format (v3)
//!
//! Grammar of one drained batch:
//!
//! ```text
//! batch  := record ("#" record)*
//! record := timestamp "," id "," label "," trace
//! trace  := frame ("@" frame)*
//! frame  := marker-char qualified-name
//! ```
//!
//! Qualified names use `;` and `/` internally; both translate to `.` on
//! decode. The per-frame marker char is an opaque fixed-width prefix and is
//! discarded. Exactly one format version is supported: the superseded
//! `;`-escaped single-field encoding is not auto-detected, it simply fails
//! to decode and is counted by the session.

pub mod decode;
pub mod encode;
pub mod split;

pub use decode::decode_record;
pub use encode::{encode_batch, encode_sample};
pub use split::split_batch;

/// Separates records inside one drained batch.
pub const BATCH_DELIMITER: char = '#';
/// Separates the four fields of a record.
pub const FIELD_SEPARATOR: char = ',';
/// Joins the frame tokens of a trace.
pub const FRAME_SEPARATOR: char = '@';
/// Internal class/method separator inside an encoded qualified name.
pub const CLASS_SEPARATOR: char = ';';
/// Internal package separator inside an encoded qualified name.
pub const PACKAGE_SEPARATOR: char = '/';
/// Marker the reference encoder writes; the decoder accepts any one char.
pub const FRAME_MARKER: char = 'L';
/// A record carries exactly this many comma-separated fields.
pub const RECORD_FIELDS: usize = 4;
