//! Tests the JSON sample dump against a real session run.

use std::io::Read;
use std::time::Duration;

use stackdrain::drain::ScriptedDrain;
use stackdrain::export::SampleDumpExporter;
use stackdrain::session::{HaltAfter, SamplingSession, SessionConfig};

fn run_session() -> stackdrain::session::SessionResult {
    let config = SessionConfig {
        poll_interval: Duration::ZERO,
        halt_after: Some(HaltAfter::Samples(2)),
    };
    let session = SamplingSession::new(config).unwrap();
    let drain = ScriptedDrain::from_batches([
        "1,10,main,Lcom/acme/App;run@Lcom/acme/Main;main",
        "2,-1,,Lm/baz",
    ]);
    let mut handle = session.start(drain);
    handle.join_within(Duration::from_secs(5)).expect("session halts")
}

#[test]
fn test_export_creates_valid_json() {
    let result = run_session();

    let mut buffer = Vec::new();
    SampleDumpExporter::new(&result).export(&mut buffer).expect("export succeeds");

    let json_str = String::from_utf8(buffer).expect("valid UTF-8");
    let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("valid JSON");

    assert_eq!(parsed["format"], "stackdrain-sample-dump-v1");
    assert_eq!(parsed["records"], 2);
    assert_eq!(parsed["decodeFailures"], 0);

    let samples = parsed["samples"].as_array().expect("samples array");
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0]["label"], "main");
    assert_eq!(samples[0]["frames"][0]["qualified_name"], "com.acme.App.run");
    // Unknown context: negative id, absent label
    assert_eq!(samples[1]["sample_id"], -1);
    assert!(samples[1]["label"].is_null());
}

#[test]
fn test_export_writes_to_file() {
    let result = run_session();

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    SampleDumpExporter::new(&result)
        .export(file.as_file_mut())
        .expect("export to file succeeds");

    let mut contents = String::new();
    file.reopen().unwrap().read_to_string(&mut contents).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("valid JSON on disk");
    assert_eq!(parsed["samples"].as_array().unwrap().len(), 2);
}
