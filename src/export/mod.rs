//! Sample export functionality
//!
//! Writes a finished session's decoded samples to a stable JSON document so
//! downstream tooling can aggregate or inspect a run without linking
//! against this crate.

pub mod sample_dump;

pub use sample_dump::SampleDumpExporter;
