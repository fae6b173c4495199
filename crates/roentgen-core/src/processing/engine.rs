use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::consts::{FILTER_CACHE_CAPACITY, PROCESSING_TIMEOUT_SECS};
use crate::error::{Result, RoentgenError};
use crate::filters::FilterKind;
use crate::raster::Raster;

use super::cache::{CacheKey, FilterCache, FilterSettings};
use super::messages::{JobId, WorkerCommand, WorkerResult};
use super::worker::{spawn_worker, FilterRunner, LibraryRunner};

/// What a [`FilterEngine::request`] call produced.
#[derive(Debug)]
pub enum Submission {
    /// The result was already cached; no job was dispatched.
    Cached(Arc<Raster>),
    /// A job is in flight; watch [`FilterEngine::poll`] for this id.
    Pending(JobId),
}

/// A settled job, reported once from [`FilterEngine::poll`].
#[derive(Clone, Debug)]
pub enum JobOutcome {
    Completed {
        job_id: JobId,
        kind: FilterKind,
        sequence: u64,
        raster: Arc<Raster>,
        elapsed: Duration,
    },
    Failed {
        job_id: JobId,
        kind: FilterKind,
        sequence: u64,
        message: String,
    },
    /// The worker did not reply within the deadline. Distinct from
    /// [`JobOutcome::Failed`] so callers can tell "took too long" from
    /// "crashed".
    TimedOut {
        job_id: JobId,
        kind: FilterKind,
        sequence: u64,
    },
}

impl JobOutcome {
    pub fn job_id(&self) -> JobId {
        match self {
            JobOutcome::Completed { job_id, .. }
            | JobOutcome::Failed { job_id, .. }
            | JobOutcome::TimedOut { job_id, .. } => *job_id,
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            JobOutcome::Completed { kind, .. }
            | JobOutcome::Failed { kind, .. }
            | JobOutcome::TimedOut { kind, .. } => *kind,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            JobOutcome::Completed { sequence, .. }
            | JobOutcome::Failed { sequence, .. }
            | JobOutcome::TimedOut { sequence, .. } => *sequence,
        }
    }
}

struct PendingJob {
    id: JobId,
    key: CacheKey,
    kind: FilterKind,
    sequence: u64,
    issued_at: Instant,
}

/// Dispatches filter jobs to the worker thread, deduplicates through the
/// result cache, and enforces the processing deadline.
///
/// One engine belongs to one viewer session. Every method runs on the
/// session's thread; the worker only ever sees rasters passed by value and
/// sends fresh ones back, so the pending map and cache have a single owner.
pub struct FilterEngine {
    cmd_tx: Option<mpsc::Sender<WorkerCommand>>,
    result_rx: mpsc::Receiver<WorkerResult>,
    pending: Vec<PendingJob>,
    cache: FilterCache,
    next_job: u64,
    timeout: Duration,
}

impl FilterEngine {
    /// Engine with the library runner and default cache/deadline limits.
    pub fn new() -> Self {
        Self::with_runner(
            LibraryRunner,
            FILTER_CACHE_CAPACITY,
            Duration::from_secs(PROCESSING_TIMEOUT_SECS),
        )
    }

    /// Engine with an explicit runner, cache capacity, and deadline.
    ///
    /// A failed thread spawn leaves the engine without a worker; requests
    /// then fail fast with [`RoentgenError::WorkerUnavailable`] instead of
    /// queueing work nothing will execute.
    pub fn with_runner<R: FilterRunner>(runner: R, capacity: usize, timeout: Duration) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = match spawn_worker(runner, result_tx) {
            Ok(tx) => Some(tx),
            Err(e) => {
                warn!("filter worker unavailable: {e}");
                None
            }
        };
        Self {
            cmd_tx,
            result_rx,
            pending: Vec::new(),
            cache: FilterCache::new(capacity),
            next_job: 0,
            timeout,
        }
    }

    pub fn is_worker_available(&self) -> bool {
        self.cmd_tx.is_some()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Request one filter stage for an image.
    ///
    /// Resolves from cache when possible. A request matching a job already
    /// in flight does not dispatch again; the pending job is retagged with
    /// the newer sequence so its result is not discarded as stale.
    pub fn request(
        &mut self,
        kind: FilterKind,
        settings: &FilterSettings,
        image_id: u64,
        input: Arc<Raster>,
        sequence: u64,
    ) -> Result<Submission> {
        let key = CacheKey::for_stage(image_id, kind, settings);

        if let Some(hit) = self.cache.get(&key) {
            debug!(kind = kind.label(), "filter cache hit");
            return Ok(Submission::Cached(hit));
        }

        if let Some(job) = self.pending.iter_mut().find(|j| j.key == key) {
            job.sequence = job.sequence.max(sequence);
            return Ok(Submission::Pending(job.id));
        }

        let Some(cmd_tx) = &self.cmd_tx else {
            return Err(RoentgenError::WorkerUnavailable);
        };

        self.next_job += 1;
        let job_id = JobId(self.next_job);
        let intensity = settings.intensity_for(kind);

        if cmd_tx
            .send(WorkerCommand::RunFilter {
                job_id,
                kind,
                intensity,
                input,
            })
            .is_err()
        {
            // The worker hung up; fail this and all future requests fast.
            self.cmd_tx = None;
            return Err(RoentgenError::WorkerUnavailable);
        }

        info!(job = %job_id, kind = kind.label(), "filter job dispatched");
        self.pending.push(PendingJob {
            id: job_id,
            key,
            kind,
            sequence,
            issued_at: Instant::now(),
        });
        Ok(Submission::Pending(job_id))
    }

    /// Drain worker replies and expire overdue jobs. Replies for ids no
    /// longer pending (already timed out or otherwise settled) are ignored.
    pub fn poll(&mut self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();

        while let Ok(WorkerResult::Finished {
            job_id,
            result,
            elapsed,
        }) = self.result_rx.try_recv()
        {
            let Some(pos) = self.pending.iter().position(|j| j.id == job_id) else {
                debug!(job = %job_id, "ignoring late reply for settled job");
                continue;
            };
            let job = self.pending.swap_remove(pos);
            match result {
                Ok(raster) => {
                    let raster = Arc::new(raster);
                    self.cache.insert(job.key, raster.clone());
                    outcomes.push(JobOutcome::Completed {
                        job_id,
                        kind: job.kind,
                        sequence: job.sequence,
                        raster,
                        elapsed,
                    });
                }
                Err(message) => {
                    warn!(job = %job_id, "filter job failed: {message}");
                    outcomes.push(JobOutcome::Failed {
                        job_id,
                        kind: job.kind,
                        sequence: job.sequence,
                        message,
                    });
                }
            }
        }

        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].issued_at.elapsed() > self.timeout {
                let job = self.pending.swap_remove(i);
                warn!(
                    job = %job.id,
                    kind = job.kind.label(),
                    secs = self.timeout.as_secs(),
                    "filter job timed out"
                );
                outcomes.push(JobOutcome::TimedOut {
                    job_id: job.id,
                    kind: job.kind,
                    sequence: job.sequence,
                });
            } else {
                i += 1;
            }
        }

        outcomes
    }

    /// Terminate the worker. Subsequent requests fail fast.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WorkerCommand::Shutdown);
        }
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FilterEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
