//! # stackdrain - Drain-and-Decode Transport for Native Stack Samples
//!
//! stackdrain moves stack-sample records from a native sampling agent into
//! a managed consumer. The agent periodically captures call-stack snapshots
//! into an internal buffer; this crate runs the drain-and-decode protocol
//! that repeatedly pulls batches of encoded records out of that buffer,
//! parses them into structured samples, and accumulates them under a
//! bounded sampling session.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────┐
//! │     Native Sampling Agent     │  (external collaborator)
//! └──────────────┬────────────────┘
//!                │ drain() → "#"-separated batch
//!                ▼
//! ┌───────────────────────────────┐
//! │   BufferDrain  (drain port)   │
//! └──────────────┬────────────────┘
//!                │ one batch per poll
//!                ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Splitter   │──▶│   Decoder    │──▶│     Sink     │
//! │ (wire::split)│   │ (wire::decode)│  │ (vec/channel)│
//! └──────────────┘   └──────────────┘   └──────────────┘
//!        driven by the SamplingSession polling worker
//! ```
//!
//! ## Module Structure
//!
//! - [`drain`]: the collaborator contract (`BufferDrain`) plus an in-memory
//!   buffer for tests and the demo binary
//! - [`wire`]: the canonical v3 wire format — batch splitting, record
//!   decoding, and the reference encoder
//! - [`session`]: the polling worker, its `Idle → Running → Stopping →
//!   Stopped` lifecycle, pluggable accumulators, and frozen statistics
//! - [`export`]: JSON dump of a finished session's samples
//! - [`domain`]: core types (`Sample`, `FrameRef`) and error taxonomy
//! - [`cli`]: argument parsing for the demo binary
//!
//! ## Key Properties
//!
//! - An empty batch is "no data yet", never an error or end-of-stream
//! - A malformed record is counted and skipped; the session keeps running
//! - A failing drain is fatal and surfaced from `stop()`, never swallowed
//! - Samples preserve drain order, which preserves capture order
//! - One polling worker per session; the drain is destructive, so the
//!   protocol is single-consumer

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod drain;
pub mod export;
pub mod session;
pub mod wire;
