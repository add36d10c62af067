//! Background frame processing
//!
//! A capture callback hands frames to [`FrameWorker::submit`], which only
//! enqueues. A dedicated thread owns the buffer pool, runs the pipeline
//! and delivers every outcome to a [`FrameSink`] (a preview surface, the
//! maze solver, or a channel feeding either).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use flume::{Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::models::{BinaryImage, RawFrame};
use crate::pipeline::Pipeline;
use crate::utils::memory_pool::BufferPool;

/// Result of processing one submitted frame
#[derive(Debug)]
pub struct FrameOutcome {
    /// Submission order, starting at 0
    pub sequence: u64,
    /// The binarized frame, or why it could not be produced
    pub result: Result<BinaryImage>,
}

/// Consumer of pipeline output
pub trait FrameSink: Send + 'static {
    /// Called on the worker thread once per processed frame
    fn deliver(&mut self, outcome: FrameOutcome);
}

impl FrameSink for Sender<FrameOutcome> {
    fn deliver(&mut self, outcome: FrameOutcome) {
        if self.send(outcome).is_err() {
            debug!("frame sink disconnected, dropping outcome");
        }
    }
}

impl<F> FrameSink for F
where
    F: FnMut(FrameOutcome) + Send + 'static,
{
    fn deliver(&mut self, outcome: FrameOutcome) {
        self(outcome)
    }
}

/// Counters for a running worker
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames accepted into the queue
    pub submitted: u64,
    /// Frames dropped because the queue was full
    pub dropped: u64,
    /// Frames that went through the pipeline (successfully or not)
    pub processed: u64,
    /// Frames whose processing returned an error
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    next_sequence: AtomicU64,
    submitted: AtomicU64,
    dropped: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
}

struct Job {
    sequence: u64,
    frame: RawFrame,
}

/// Owns a pipeline thread fed through a bounded queue
pub struct FrameWorker {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl FrameWorker {
    /// Start a worker with room for `capacity` pending frames
    pub fn spawn<S: FrameSink>(pipeline: Pipeline, capacity: usize, sink: S) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidParameter(
                "worker queue capacity must be greater than 0".to_string(),
            ));
        }

        let (tx, rx) = flume::bounded::<Job>(capacity);
        let counters = Arc::new(Counters::default());
        let thread_counters = Arc::clone(&counters);

        let handle = std::thread::Builder::new()
            .name("frame_worker".to_string())
            .spawn(move || run_worker(pipeline, rx, sink, thread_counters))?;

        info!(capacity, "frame worker started");
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            counters,
        })
    }

    /// Queue a frame without blocking.
    ///
    /// Returns `false` when the queue is full (or the worker is gone) and
    /// the frame was dropped, like acquiring only the latest camera image.
    pub fn submit(&self, frame: RawFrame) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let sequence = self.counters.next_sequence.fetch_add(1, Ordering::Relaxed);
        match tx.try_send(Job { sequence, frame }) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(sequence, "worker busy, frame dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(sequence, "frame worker stopped, frame dropped");
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Snapshot of the worker counters
    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            processed: self.counters.processed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting frames, finish the queued ones and join the thread
    pub fn shutdown(mut self) -> WorkerStats {
        self.stop();
        self.stats()
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("frame worker thread panicked");
            }
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: FrameSink>(
    pipeline: Pipeline,
    rx: Receiver<Job>,
    mut sink: S,
    counters: Arc<Counters>,
) {
    let mut pool = BufferPool::new();
    for job in rx.iter() {
        let result = pipeline.process_pooled(&job.frame, &mut pool);
        counters.processed.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = &result {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(sequence = job.sequence, "frame failed: {}", e);
        }
        sink.deliver(FrameOutcome {
            sequence: job.sequence,
            result,
        });
    }
    debug!("frame worker queue closed");
}
