use std::sync::mpsc;
use std::time::Instant;

use tracing::debug;

use crate::filters::{self, FilterKind};
use crate::raster::Raster;

use super::messages::{WorkerCommand, WorkerResult};

/// Executes filter stages on the worker thread.
///
/// The engine is generic over this seam so an alternative execution backend
/// (or a deliberately slow one in tests) can stand in for the library.
pub trait FilterRunner: Send + 'static {
    fn run(
        &self,
        kind: FilterKind,
        input: &Raster,
        intensity: f32,
    ) -> std::result::Result<Raster, String>;
}

/// Default runner backed directly by the filter library.
pub struct LibraryRunner;

impl FilterRunner for LibraryRunner {
    fn run(
        &self,
        kind: FilterKind,
        input: &Raster,
        intensity: f32,
    ) -> std::result::Result<Raster, String> {
        Ok(filters::apply(kind, input, intensity))
    }
}

/// Spawn the worker thread. Returns the command sender, or the spawn error
/// when the environment refuses a new thread.
pub fn spawn_worker<R: FilterRunner>(
    runner: R,
    result_tx: mpsc::Sender<WorkerResult>,
) -> std::io::Result<mpsc::Sender<WorkerCommand>> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("roentgen-filter".into())
        .spawn(move || {
            worker_loop(runner, cmd_rx, result_tx);
        })?;

    Ok(cmd_tx)
}

fn worker_loop<R: FilterRunner>(
    runner: R,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            WorkerCommand::RunFilter {
                job_id,
                kind,
                intensity,
                input,
            } => {
                let start = Instant::now();
                let result = runner.run(kind, &input, intensity);
                let elapsed = start.elapsed();
                debug!(
                    job = %job_id,
                    kind = kind.label(),
                    ms = elapsed.as_millis() as u64,
                    ok = result.is_ok(),
                    "filter stage finished"
                );
                let _ = tx.send(WorkerResult::Finished {
                    job_id,
                    result,
                    elapsed,
                });
            }
            WorkerCommand::Shutdown => break,
        }
    }
}
