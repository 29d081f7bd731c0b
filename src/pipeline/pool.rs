use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, trace, warn};
use tracing_futures::Instrument;

use crate::pipeline::tasks::Task;
use crate::pipeline::{Mode, TaskResult};
use crate::resolver::{Error, Prober, QueryExecutor};

type TaskQueue = Arc<Mutex<mpsc::Receiver<Task>>>;

/// What a worker does with each task.
#[derive(Clone)]
pub(crate) struct Worker {
    pub(crate) mode: Mode,
    pub(crate) prober: Prober,
    pub(crate) executor: QueryExecutor,
}

impl Worker {
    async fn run(
        self,
        tasks: TaskQueue,
        results: mpsc::Sender<TaskResult>,
        shutdown: CancellationToken,
        _live: LiveGuard,
    ) {
        let mut done = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = async { tasks.lock().await.recv().await } => next,
            };
            let Some(task) = next else { break };

            let result = self.perform(task, &shutdown).await;
            done += 1;

            tokio::select! {
                biased;
                permit = results.reserve() => match permit {
                    Ok(permit) => permit.send(result),
                    Err(_) => {
                        warn!("Result consumer is gone; dropping result for {}.", result.server);
                        break;
                    }
                },
                _ = shutdown.cancelled() => {
                    // Best effort: a consumer that stopped reading must not keep the worker alive.
                    if results.try_send(result).is_err() {
                        debug!("Dropped a result on cancellation.");
                    }
                    break;
                }
            }
        }
        debug!("Worker finished after {} tasks.", done);
    }

    async fn perform(&self, task: Task, shutdown: &CancellationToken) -> TaskResult {
        let Task { server, query } = task;
        trace!("Performing {} on '{}' at {}.", self.mode, query, server);

        let outcome = match self.mode {
            Mode::Check => self.prober.check(&server, shutdown).await,
            Mode::CheckThenQuery => match self.prober.check(&server, shutdown).await {
                Ok(_) => self.executor.execute(&server, &query, shutdown).await,
                Err(Error::Cancelled) => Err(Error::Cancelled),
                Err(_) => Err(Error::InvalidServer),
            },
            Mode::Query => self.executor.execute(&server, &query, shutdown).await,
        };

        TaskResult {
            server,
            query,
            checked_at: Utc::now(),
            outcome,
        }
    }
}

/// Counts a worker out when it terminates, whatever the reason.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A fixed number of workers sharing one task queue and one result queue.
///
/// The pool keeps no sender of the result queue, so the queue closes exactly when the last worker has
/// terminated.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub(crate) fn spawn(
        concurrency: usize,
        worker: Worker,
        tasks: mpsc::Receiver<Task>,
        results: mpsc::Sender<TaskResult>,
        shutdown: CancellationToken,
    ) -> WorkerPool {
        let tasks: TaskQueue = Arc::new(Mutex::new(tasks));
        let live = Arc::new(AtomicUsize::new(concurrency));

        let handles = (0..concurrency)
            .map(|id| {
                let guard = LiveGuard(live.clone());
                let span = info_span!("worker", id);
                tokio::spawn(
                    worker
                        .clone()
                        .run(tasks.clone(), results.clone(), shutdown.clone(), guard)
                        .instrument(span),
                )
            })
            .collect();

        WorkerPool { handles, live }
    }

    /// Number of workers that have not terminated yet.
    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn live_counter(&self) -> Arc<AtomicUsize> {
        self.live.clone()
    }

    /// Waits for all workers to terminate.
    pub(crate) async fn join(self) {
        for res in join_all(self.handles).await {
            if let Err(err) = res {
                warn!("Worker terminated abnormally: {}", err);
            }
        }
    }
}
