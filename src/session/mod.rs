//! Sampling session: the polling worker and its lifecycle
//!
//! A session owns one dedicated polling thread that repeatedly drains the
//! collaborator, splits the batch, decodes each record, and appends the
//! surviving samples to its sink. The caller controls the lifecycle through
//! a [`SessionHandle`]: cooperative cancellation via `stop()`, bounded
//! waits, and frozen statistics once the worker has exited.
//!
//! State machine: `Idle → Running → Stopping → Stopped`. A session that
//! reaches its halt bound (or a collaborator failure) goes straight from
//! `Running` to `Stopped`. `Stopped` is terminal; construct a new session
//! for a new run.

pub mod config;
pub mod sink;

pub use config::{HaltAfter, SessionConfig, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL};
pub use sink::{ChannelSink, SampleSink, VecSink};

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info};

use crate::domain::{DrainError, Sample, SessionError};
use crate::drain::BufferDrain;
use crate::wire::{decode_record, split_batch};

/// Default bounded wait for the worker in `stop()`. Generous; a healthy
/// worker observes the cancellation flag within one poll interval.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

/// Frozen statistics and (in the default in-memory mode) the decoded
/// samples of one finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    /// Decoded samples in drain order. Empty in streaming mode, and on a
    /// collaborator failure the partial set stays readable through
    /// [`SessionHandle::samples`] instead.
    pub samples: Vec<Sample>,
    /// Successfully decoded records.
    pub records: u64,
    /// Records skipped as malformed.
    pub decode_failures: u64,
    /// Drains that returned the empty "no data yet" batch.
    pub empty_batches: u64,
    /// Total drain calls made.
    pub drains: u64,
    pub elapsed: Duration,
    /// Decoded records per millisecond of session time.
    pub throughput_per_ms: f64,
}

// Flags shared between the caller and the polling worker.
#[derive(Debug, Default)]
struct Shared {
    cancel: AtomicBool,
    state: AtomicU8,
}

struct WorkerReport {
    result: SessionResult,
    failure: Option<DrainError>,
}

/// A configured session, ready to start. `Idle` until [`start`] spawns the
/// polling worker.
///
/// [`start`]: SamplingSession::start
#[derive(Debug)]
pub struct SamplingSession {
    config: SessionConfig,
    shared: Arc<Shared>,
}

impl SamplingSession {
    /// Validates the configuration and creates an `Idle` session.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfiguration`] before any worker is spawned.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self { config, shared: Arc::new(Shared::default()) })
    }

    /// Current lifecycle state; `Idle` until started.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Starts the polling worker with the default in-memory accumulator.
    ///
    /// The drain is moved into the worker: draining is destructive, so the
    /// protocol is single-consumer and one worker owns the collaborator
    /// for the session's lifetime.
    pub fn start<D: BufferDrain + 'static>(self, drain: D) -> SessionHandle {
        self.spawn(drain, Box::new(VecSink::new()))
    }

    /// Starts the polling worker streaming each decoded sample to `tx` as
    /// it arrives: the explicit live-progress mode. The final
    /// `SessionResult` carries statistics only.
    pub fn start_streaming<D: BufferDrain + 'static>(
        self,
        drain: D,
        tx: Sender<Sample>,
    ) -> SessionHandle {
        self.spawn(drain, Box::new(ChannelSink::new(tx)))
    }

    fn spawn<D: BufferDrain + 'static>(
        self,
        mut drain: D,
        mut sample_sink: Box<dyn SampleSink>,
    ) -> SessionHandle {
        let config = self.config;
        let shared = Arc::clone(&self.shared);
        shared.state.store(SessionState::Running as u8, Ordering::Release);

        let (result_tx, result_rx) = bounded(1);
        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || {
            let started = Instant::now();
            let (tally, failure) =
                run_poll_loop(&config, &worker_shared, &mut drain, sample_sink.as_mut());
            let elapsed = started.elapsed();
            worker_shared.state.store(SessionState::Stopped as u8, Ordering::Release);

            let result = finalize(tally, sample_sink.into_samples(), elapsed);
            info!(
                "session stopped: {} records, {} decode failures, {} drains in {:.1?}",
                result.records, result.decode_failures, result.drains, result.elapsed
            );
            // Receiver lives in the handle; if the handle was dropped the
            // report has nowhere to go and is discarded with the worker.
            let _ = result_tx.send(WorkerReport { result, failure });
        });

        SessionHandle { shared, result_rx, worker: Some(worker), report: None }
    }
}

/// Caller-side handle to a running (or finished) session.
pub struct SessionHandle {
    shared: Arc<Shared>,
    result_rx: Receiver<WorkerReport>,
    worker: Option<thread::JoinHandle<()>>,
    report: Option<WorkerReport>,
}

impl SessionHandle {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Requests cancellation and waits (bounded by
    /// [`DEFAULT_STOP_TIMEOUT`]) for the worker to exit.
    ///
    /// Idempotent: repeated calls return the same value without touching
    /// the worker again.
    ///
    /// # Errors
    /// [`SessionError::Collaborator`] if the drain failed during the run,
    /// [`SessionError::JoinTimeout`] if the worker did not exit in time.
    pub fn stop(&mut self) -> Result<SessionResult, SessionError> {
        self.stop_within(DEFAULT_STOP_TIMEOUT)
    }

    /// [`stop`](Self::stop) with an explicit bounded wait, so a caller can
    /// detect a stuck drain. A timed-out stop is not cached; a later call
    /// may still collect the result if the worker eventually exits.
    pub fn stop_within(&mut self, timeout: Duration) -> Result<SessionResult, SessionError> {
        if self.report.is_none() {
            self.shared.cancel.store(true, Ordering::Release);
            // Only a running worker moves to Stopping; a worker that
            // already halted on its own is Stopped and stays there.
            let _ = self.shared.state.compare_exchange(
                SessionState::Running as u8,
                SessionState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        self.await_report(timeout)?;
        self.cached_outcome()
    }

    /// Waits for the session to halt on its own bound without requesting
    /// cancellation. Same caching and error behavior as
    /// [`stop_within`](Self::stop_within).
    pub fn join_within(&mut self, timeout: Duration) -> Result<SessionResult, SessionError> {
        self.await_report(timeout)?;
        self.cached_outcome()
    }

    /// Decoded samples, available once the session has stopped. Empty
    /// before that, and after streaming sessions. Kept even when the
    /// session ended in a collaborator failure.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        self.report.as_ref().map_or(&[], |report| report.result.samples.as_slice())
    }

    fn await_report(&mut self, timeout: Duration) -> Result<(), SessionError> {
        if self.report.is_some() {
            return Ok(());
        }
        let report = self.result_rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => SessionError::JoinTimeout(timeout),
            // Worker gone without reporting (panic); surface it rather
            // than pretending the wait timed out.
            RecvTimeoutError::Disconnected => {
                SessionError::Collaborator(DrainError::new("polling worker exited abnormally"))
            }
        })?;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.report = Some(report);
        Ok(())
    }

    fn cached_outcome(&self) -> Result<SessionResult, SessionError> {
        match &self.report {
            Some(WorkerReport { failure: Some(err), .. }) => {
                Err(SessionError::Collaborator(err.clone()))
            }
            Some(WorkerReport { result, .. }) => Ok(result.clone()),
            None => unreachable!("report awaited before cached_outcome"),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        // A dropped handle can no longer stop the worker; cancel it so the
        // thread exits instead of polling forever. The worker's report is
        // discarded with the channel.
        self.shared.cancel.store(true, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct LoopTally {
    records: u64,
    decode_failures: u64,
    empty_batches: u64,
    drains: u64,
}

/// Loop body: drain → split → decode → append, with the cancellation flag
/// checked at the top of each iteration and the backoff sleep at the
/// bottom. A malformed record is counted and skipped; a drain failure ends
/// the loop.
fn run_poll_loop(
    config: &SessionConfig,
    shared: &Shared,
    drain: &mut dyn BufferDrain,
    sample_sink: &mut dyn SampleSink,
) -> (LoopTally, Option<DrainError>) {
    let started = Instant::now();
    let mut tally = LoopTally::default();

    loop {
        if shared.cancel.load(Ordering::Acquire) {
            break;
        }
        if halt_reached(config.halt_after, &tally, started.elapsed()) {
            break;
        }

        let batch = match drain.drain() {
            Ok(batch) => batch,
            Err(err) => return (tally, Some(err)),
        };
        tally.drains += 1;

        if batch.is_empty() {
            tally.empty_batches += 1;
        } else {
            for record in split_batch(&batch) {
                match decode_record(record) {
                    Ok(sample) => {
                        tally.records += 1;
                        sample_sink.accept(sample);
                    }
                    Err(err) => {
                        tally.decode_failures += 1;
                        debug!("skipping malformed record: {err}");
                    }
                }
            }
        }

        // Re-check the bound before sleeping so a tripped bound does not
        // cost one more poll interval.
        if halt_reached(config.halt_after, &tally, started.elapsed()) {
            break;
        }
        if !config.poll_interval.is_zero() {
            thread::sleep(config.poll_interval);
        }
    }

    (tally, None)
}

fn halt_reached(halt: Option<HaltAfter>, tally: &LoopTally, elapsed: Duration) -> bool {
    match halt {
        None => false,
        Some(HaltAfter::Duration(limit)) => elapsed >= limit,
        Some(HaltAfter::Samples(bound)) => tally.records >= bound,
        Some(HaltAfter::EmptyBatches(bound)) => tally.empty_batches >= bound,
    }
}

#[allow(clippy::cast_precision_loss)]
fn finalize(tally: LoopTally, samples: Vec<Sample>, elapsed: Duration) -> SessionResult {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    let throughput_per_ms =
        if elapsed_ms > 0.0 { tally.records as f64 / elapsed_ms } else { 0.0 };
    SessionResult {
        samples,
        records: tally.records,
        decode_failures: tally.decode_failures,
        empty_batches: tally.empty_batches,
        drains: tally.drains,
        elapsed,
        throughput_per_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drain::ScriptedDrain;

    fn busy_config(halt: HaltAfter) -> SessionConfig {
        SessionConfig { poll_interval: Duration::ZERO, halt_after: Some(halt) }
    }

    #[test]
    fn test_invalid_config_rejected_before_spawn() {
        let config =
            SessionConfig { poll_interval: Duration::from_secs(10), halt_after: None };
        assert!(matches!(
            SamplingSession::new(config),
            Err(SessionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_session_is_idle_until_started() {
        let session = SamplingSession::new(SessionConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        let mut handle = session.start(ScriptedDrain::from_batches([]));
        // Running or already Stopping/Stopped, but never Idle again
        assert_ne!(handle.state(), SessionState::Idle);
        handle.stop().unwrap();
        assert_eq!(handle.state(), SessionState::Stopped);
    }

    #[test]
    fn test_session_halts_on_sample_bound() {
        let session = SamplingSession::new(busy_config(HaltAfter::Samples(2))).unwrap();
        let mut handle = session.start(ScriptedDrain::from_batches([
            "1,10,main,Lm/foo",
            "2,11,worker,Lm/bar",
            "3,12,extra,Lm/baz",
        ]));

        let result = handle.join_within(Duration::from_secs(2)).unwrap();
        assert_eq!(result.records, 2);
        assert_eq!(result.decode_failures, 0);
        assert_eq!(handle.state(), SessionState::Stopped);
    }

    #[test]
    fn test_session_halts_on_empty_batch_bound() {
        let session = SamplingSession::new(busy_config(HaltAfter::EmptyBatches(3))).unwrap();
        let mut handle = session.start(ScriptedDrain::from_batches([]));

        let result = handle.join_within(Duration::from_secs(2)).unwrap();
        assert_eq!(result.records, 0);
        assert!(result.samples.is_empty());
        assert_eq!(result.empty_batches, 3);
    }

    #[test]
    fn test_halt_reached_bounds() {
        let tally = LoopTally { records: 5, empty_batches: 2, ..Default::default() };
        assert!(halt_reached(Some(HaltAfter::Samples(5)), &tally, Duration::ZERO));
        assert!(!halt_reached(Some(HaltAfter::Samples(6)), &tally, Duration::ZERO));
        assert!(halt_reached(Some(HaltAfter::EmptyBatches(2)), &tally, Duration::ZERO));
        assert!(!halt_reached(None, &tally, Duration::from_secs(1000)));
        assert!(halt_reached(
            Some(HaltAfter::Duration(Duration::from_millis(1))),
            &tally,
            Duration::from_millis(1)
        ));
    }

    #[test]
    fn test_finalize_throughput() {
        let tally = LoopTally { records: 500, ..Default::default() };
        let result = finalize(tally, Vec::new(), Duration::from_millis(100));
        assert!((result.throughput_per_ms - 5.0).abs() < 0.01);
    }
}
