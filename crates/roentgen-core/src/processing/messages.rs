use std::sync::Arc;
use std::time::Duration;

use crate::filters::FilterKind;
use crate::raster::Raster;

/// Identity of one dispatched filter job, unique per engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands accepted by the filter worker thread.
pub enum WorkerCommand {
    /// Run one filter stage over the supplied raster.
    RunFilter {
        job_id: JobId,
        kind: FilterKind,
        intensity: f32,
        input: Arc<Raster>,
    },
    /// Exit the worker loop.
    Shutdown,
}

/// Replies sent back from the filter worker thread.
pub enum WorkerResult {
    /// A job finished, successfully or not.
    Finished {
        job_id: JobId,
        result: std::result::Result<Raster, String>,
        elapsed: Duration,
    },
}
