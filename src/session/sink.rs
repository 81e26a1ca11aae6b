//! Pluggable sample accumulators
//!
//! The default sink buffers samples in memory and hands them back with the
//! session result (ownership transfer, no locking). For long-running
//! sessions that would otherwise grow without bound, `ChannelSink` streams
//! each sample to a consumer as it is decoded instead.

use crossbeam_channel::Sender;
use log::warn;

use crate::domain::Sample;

/// Receives decoded samples from the polling worker, in drain order.
///
/// Single writer: only the worker calls `accept`.
pub trait SampleSink: Send {
    fn accept(&mut self, sample: Sample);

    /// Consumes the sink and yields whatever it retained. Streaming sinks
    /// return an empty vector.
    fn into_samples(self: Box<Self>) -> Vec<Sample>;
}

/// In-memory accumulator; the default.
#[derive(Debug, Default)]
pub struct VecSink {
    samples: Vec<Sample>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleSink for VecSink {
    fn accept(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    fn into_samples(self: Box<Self>) -> Vec<Sample> {
        self.samples
    }
}

/// Streams each sample to a channel as it is decoded: the explicit
/// live-progress mode. Retains nothing.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<Sample>,
    disconnected: bool,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: Sender<Sample>) -> Self {
        Self { tx, disconnected: false }
    }
}

impl SampleSink for ChannelSink {
    fn accept(&mut self, sample: Sample) {
        if self.tx.send(sample).is_err() && !self.disconnected {
            // Receiver went away; later samples are dropped silently
            warn!("sample consumer disconnected, dropping further samples");
            self.disconnected = true;
        }
    }

    fn into_samples(self: Box<Self>) -> Vec<Sample> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrameRef, SampleId, Timestamp};

    fn sample(timestamp: i64) -> Sample {
        Sample {
            timestamp: Timestamp(timestamp),
            sample_id: SampleId(1),
            label: None,
            frames: vec![FrameRef::new("m.foo")],
        }
    }

    #[test]
    fn test_vec_sink_retains_in_order() {
        let mut sink = VecSink::new();
        sink.accept(sample(1));
        sink.accept(sample(2));
        let samples = Box::new(sink).into_samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, Timestamp(1));
        assert_eq!(samples[1].timestamp, Timestamp(2));
    }

    #[test]
    fn test_channel_sink_streams_and_retains_nothing() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sink = ChannelSink::new(tx);
        sink.accept(sample(1));
        assert_eq!(rx.recv().unwrap().timestamp, Timestamp(1));
        assert!(Box::new(sink).into_samples().is_empty());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        sink.accept(sample(1));
        sink.accept(sample(2)); // no panic
    }
}
