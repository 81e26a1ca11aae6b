//! # stackdrain - Demo / Benchmark Entry Point
//!
//! Runs a sampling session against a synthetic in-process producer: a
//! producer thread encodes canned call stacks into a [`SharedBuffer`] at a
//! configurable rate while the session's polling worker drains and decodes
//! them. Useful for benchmarking the decode path and for exercising the
//! whole pipeline without a native agent attached.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stackdrain::cli::Args;
use stackdrain::domain::{FrameRef, Sample, SampleId, Timestamp};
use stackdrain::drain::SharedBuffer;
use stackdrain::export::SampleDumpExporter;
use stackdrain::session::{HaltAfter, SamplingSession, SessionConfig};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

/// Canned call stacks for the synthetic producer, leaf first.
const SYNTHETIC_STACKS: &[&[&str]] = &[
    &["com.acme.Worker.poll", "com.acme.Worker.run", "java.lang.Thread.run"],
    &["com.acme.Codec.decode", "com.acme.Worker.poll", "com.acme.Worker.run"],
    &["java.util.HashMap.get", "com.acme.Cache.lookup", "com.acme.Worker.run"],
];

/// Producer thread feeding the shared buffer at roughly `rate` records per
/// second until stopped. Returns the number of records produced.
struct SyntheticProducer {
    stop: Arc<AtomicBool>,
    worker: thread::JoinHandle<u64>,
}

impl SyntheticProducer {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss
    )]
    fn spawn(buffer: SharedBuffer, rate: u64) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let worker = thread::spawn(move || {
            let started = Instant::now();
            let mut produced: u64 = 0;
            while !stop_flag.load(Ordering::Acquire) {
                // Catch up to the target count for the elapsed time
                let target = started.elapsed().as_secs_f64() * rate as f64;
                while (produced as f64) < target {
                    let stack = SYNTHETIC_STACKS[(produced as usize) % SYNTHETIC_STACKS.len()];
                    buffer.push_sample(&Sample {
                        timestamp: Timestamp(started.elapsed().as_nanos() as i64),
                        sample_id: SampleId((produced % 4) as i64),
                        label: Some(format!("worker-{}", produced % 4)),
                        frames: stack.iter().map(|f| FrameRef::new(*f)).collect(),
                    });
                    produced += 1;
                }
                thread::sleep(Duration::from_millis(1));
            }
            produced
        });
        Self { stop, worker }
    }

    fn stop(self) -> u64 {
        self.stop.store(true, Ordering::Release);
        self.worker.join().unwrap_or(0)
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let config = SessionConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        halt_after: args.halt_after_samples.map(HaltAfter::Samples),
    };
    let session = SamplingSession::new(config).context("invalid session configuration")?;

    if !quiet {
        println!("stackdrain v{}", env!("CARGO_PKG_VERSION"));
        println!("poll interval: {:?}", config.poll_interval);
        println!("producer rate: {} records/s", args.rate);
    }

    let buffer = SharedBuffer::new();
    let producer = SyntheticProducer::spawn(buffer.clone(), args.rate);
    let mut handle = session.start(buffer);

    let run_for =
        if args.duration > 0 { Some(Duration::from_secs(args.duration)) } else { None };

    // Bounded run racing Ctrl-C
    let mut exit_reason = "duration limit reached";
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            exit_reason = "interrupted";
        }
        () = async {
            match run_for {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        } => {}
    }

    let produced = producer.stop();
    info!("producer stopped after {produced} records");

    let result = handle.stop().context("session failed")?;

    if !quiet {
        eprintln!(
            "\n{}: {:.1}s, {} samples ({} decode failures, {} drains / {} empty, {:.1} samples/ms)",
            exit_reason,
            result.elapsed.as_secs_f64(),
            result.records,
            result.decode_failures,
            result.drains,
            result.empty_batches,
            result.throughput_per_ms,
        );
    }

    if let Some(export_path) = args.export {
        let file = File::create(&export_path).context("Failed to create export file")?;
        let writer = BufWriter::new(file);
        SampleDumpExporter::new(&result).export(writer).context("Failed to export samples")?;
        if !quiet {
            println!("saved: {}", export_path.display());
        }
    }

    Ok(())
}
