//! Record decoding
//!
//! Turns one encoded record into a [`Sample`]. Decoding is pure: same input,
//! same output, no I/O. Anything that does not match the canonical field
//! layout is a [`MalformedRecord`], which the session counts and skips.

use super::{CLASS_SEPARATOR, FIELD_SEPARATOR, FRAME_SEPARATOR, PACKAGE_SEPARATOR, RECORD_FIELDS};
use crate::domain::{FrameRef, MalformedRecord, Sample, SampleId, Timestamp};

/// Decodes one encoded record into a structured [`Sample`].
///
/// Field layout: `timestamp,id,label,trace`. The trace is the final field,
/// so qualified names may contain further commas without breaking the
/// split. The label is taken verbatim; empty becomes `None`.
///
/// # Errors
/// Returns [`MalformedRecord`] when the field arity is wrong, a numeric
/// field fails to parse, or the trace decodes to zero frames.
pub fn decode_record(record: &str) -> Result<Sample, MalformedRecord> {
    let fields: Vec<&str> = record.splitn(RECORD_FIELDS, FIELD_SEPARATOR).collect();
    if fields.len() != RECORD_FIELDS {
        return Err(MalformedRecord::FieldArity(fields.len()));
    }

    let timestamp = parse_integer(fields[0], "timestamp")?;
    let id = parse_integer(fields[1], "id")?;
    let label = if fields[2].is_empty() { None } else { Some(fields[2].to_string()) };

    // Empty tokens are tolerated (trailing frame separator from the native
    // encoder) but a trace with no surviving frames is a decode error, not
    // a valid empty sample.
    let mut frames = Vec::new();
    for token in fields[3].split(FRAME_SEPARATOR).filter(|token| !token.is_empty()) {
        frames.push(decode_frame(token)?);
    }
    if frames.is_empty() {
        return Err(MalformedRecord::EmptyTrace);
    }

    Ok(Sample { timestamp: Timestamp(timestamp), sample_id: SampleId(id), label, frames })
}

fn parse_integer(value: &str, field: &'static str) -> Result<i64, MalformedRecord> {
    value
        .parse::<i64>()
        .map_err(|_| MalformedRecord::BadInteger { field, value: value.to_string() })
}

/// Decodes one frame token: strip the one-char marker, then translate the
/// internal `;` and `/` separators to `.`.
///
/// The marker's value is not interpreted here; it is a fixed-width prefix
/// owned by the native encoder.
fn decode_frame(token: &str) -> Result<FrameRef, MalformedRecord> {
    let mut chars = token.chars();
    chars.next(); // marker
    let qualified_name: String = chars
        .map(|c| if c == CLASS_SEPARATOR || c == PACKAGE_SEPARATOR { '.' } else { c })
        .collect();
    if qualified_name.is_empty() {
        return Err(MalformedRecord::EmptyFrame(token.to_string()));
    }
    Ok(FrameRef { qualified_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let sample = decode_record("1,10,main,Lcom/acme/App;run@Lcom/acme/Main;main").unwrap();
        assert_eq!(sample.timestamp, Timestamp(1));
        assert_eq!(sample.sample_id, SampleId(10));
        assert_eq!(sample.label.as_deref(), Some("main"));
        assert_eq!(
            sample.frames,
            vec![FrameRef::new("com.acme.App.run"), FrameRef::new("com.acme.Main.main")]
        );
    }

    #[test]
    fn test_decode_preserves_leaf_first_order() {
        let sample = decode_record("5,1,t,La@Lb@Lc").unwrap();
        let names: Vec<&str> =
            sample.frames.iter().map(|f| f.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_label_decodes_to_none() {
        let sample = decode_record("1,-1,,Lm/foo").unwrap();
        assert_eq!(sample.label, None);
        assert_eq!(sample.display_label(), "unknown");
        assert!(sample.sample_id.is_unknown());
    }

    #[test]
    fn test_negative_timestamp_and_id_parse() {
        let sample = decode_record("-7,-2,x,Lm/foo").unwrap();
        assert_eq!(sample.timestamp, Timestamp(-7));
        assert_eq!(sample.sample_id, SampleId(-2));
    }

    #[test]
    fn test_non_numeric_timestamp_is_malformed() {
        let err = decode_record("abc,10,main,Lm/foo").unwrap_err();
        assert_eq!(
            err,
            MalformedRecord::BadInteger { field: "timestamp", value: "abc".to_string() }
        );
    }

    #[test]
    fn test_non_numeric_id_is_malformed() {
        let err = decode_record("1,ten,main,Lm/foo").unwrap_err();
        assert_eq!(err, MalformedRecord::BadInteger { field: "id", value: "ten".to_string() });
    }

    #[test]
    fn test_missing_fields_is_malformed() {
        assert_eq!(decode_record("1,10,main").unwrap_err(), MalformedRecord::FieldArity(3));
        assert_eq!(decode_record("").unwrap_err(), MalformedRecord::FieldArity(1));
    }

    #[test]
    fn test_empty_trace_is_malformed() {
        assert_eq!(decode_record("1,10,main,").unwrap_err(), MalformedRecord::EmptyTrace);
        // Only separators, no frame tokens
        assert_eq!(decode_record("1,10,main,@@").unwrap_err(), MalformedRecord::EmptyTrace);
    }

    #[test]
    fn test_marker_only_frame_token_is_malformed() {
        let err = decode_record("1,10,main,L").unwrap_err();
        assert_eq!(err, MalformedRecord::EmptyFrame("L".to_string()));
    }

    #[test]
    fn test_trailing_frame_separator_is_tolerated() {
        // The native encoder terminates the trace with a separator
        let sample = decode_record("1,10,main,Lm/foo@Lm/bar@").unwrap();
        assert_eq!(sample.frames.len(), 2);
    }

    #[test]
    fn test_marker_value_is_not_interpreted() {
        let sample = decode_record("1,10,main,Xm/foo").unwrap();
        assert_eq!(sample.frames, vec![FrameRef::new("m.foo")]);
    }

    #[test]
    fn test_comma_after_third_field_stays_in_trace() {
        // splitn keeps everything after the label's comma as the trace, so
        // a stray comma lands inside the qualified name instead of
        // producing a phantom fifth field
        let sample = decode_record("1,10,main,Lm/foo,extra").unwrap();
        assert_eq!(sample.frames[0].qualified_name, "m.foo,extra");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let a = decode_record("1,10,main,Lm/foo@Lm/bar").unwrap();
        let b = decode_record("1,10,main,Lm/foo@Lm/bar").unwrap();
        assert_eq!(a, b);
    }
}
