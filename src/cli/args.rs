//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stackdrain",
    about = "Drain and decode native stack samples through a bounded session",
    after_help = "\
EXAMPLES:
    stackdrain                                Run 5s against the synthetic producer
    stackdrain --duration 0                   Run until Ctrl-C
    stackdrain --poll-interval-ms 0 --rate 100000
                                              Busy-poll benchmark
    stackdrain --export samples.json          Dump decoded samples as JSON"
)]
pub struct Args {
    /// Seconds to run the session (0 = until Ctrl-C)
    #[arg(long, default_value = "5")]
    pub duration: u64,

    /// Backoff between drains in milliseconds (0 = busy poll)
    #[arg(long, default_value = "1")]
    pub poll_interval_ms: u64,

    /// Stop once this many samples have been decoded
    #[arg(long, value_name = "N")]
    pub halt_after_samples: Option<u64>,

    /// Synthetic producer rate, records per second
    #[arg(long, default_value = "1000")]
    pub rate: u64,

    /// Export decoded samples to a JSON file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
