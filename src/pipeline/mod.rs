//! The concurrent probing pipeline.
//!
//! Nameserver records flow from a record source through a bounded task queue into a fixed pool of workers.
//! Every task yields exactly one `TaskResult` on the result stream, which closes once the last worker has
//! terminated.

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use tasks::{build, Task};

use crate::error::Error;
use crate::nameserver::NameServer;
use crate::pipeline::pool::{Worker, WorkerPool};
use crate::query::Query;
use crate::rate_limit::RateLimiter;
use crate::resolver::{self, Prober, QueryExecutor, Resolve, ResolverResult};
use crate::resources::Record;
use crate::Result;

mod pool;
pub mod tasks;

/// What the workers do with each nameserver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Canary check only
    Check,
    /// Canary check; the query runs only against valid nameservers
    CheckThenQuery,
    /// Query only
    Query,
}

impl Mode {
    fn default_concurrency(self) -> usize {
        match self {
            Mode::Check => 256,
            Mode::CheckThenQuery | Mode::Query => 64,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            Mode::Check => "check",
            Mode::CheckThenQuery => "check-then-query",
            Mode::Query => "query",
        };
        write!(f, "{}", str)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(str: &str) -> Result<Self> {
        match str {
            "check" => Ok(Mode::Check),
            "check-then-query" => Ok(Mode::CheckThenQuery),
            "query" => Ok(Mode::Query),
            _ => Err(Error::ParserError {
                what: str.to_string(),
                to: "Mode",
                why: "no such mode".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOpts {
    pub mode: Mode,
    /// Number of workers
    pub concurrency: usize,
    /// Bound of both, the task queue and the result queue
    pub queue_capacity: usize,
    /// Minimum distance between any two network attempts of all workers
    pub rate_interval: Duration,
    pub check_attempts: usize,
    pub query_attempts: usize,
    pub canary: Query,
}

impl PipelineOpts {
    pub fn new(mode: Mode) -> Result<PipelineOpts> {
        Ok(PipelineOpts {
            mode,
            concurrency: mode.default_concurrency(),
            queue_capacity: 64,
            rate_interval: Duration::from_millis(10),
            check_attempts: 5,
            query_attempts: 3,
            canary: Query::canary()?,
        })
    }

    pub fn with_concurrency(self, concurrency: usize) -> Self {
        PipelineOpts { concurrency, ..self }
    }

    pub fn with_queue_capacity(self, queue_capacity: usize) -> Self {
        PipelineOpts { queue_capacity, ..self }
    }

    pub fn with_rate_interval(self, rate_interval: Duration) -> Self {
        PipelineOpts { rate_interval, ..self }
    }

    pub fn with_check_attempts(self, check_attempts: usize) -> Self {
        PipelineOpts { check_attempts, ..self }
    }

    pub fn with_query_attempts(self, query_attempts: usize) -> Self {
        PipelineOpts { query_attempts, ..self }
    }

    pub fn with_canary(self, canary: Query) -> Self {
        PipelineOpts { canary, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        let must_be_positive = [
            ("concurrency", self.concurrency),
            ("queue capacity", self.queue_capacity),
            ("check attempts", self.check_attempts),
            ("query attempts", self.query_attempts),
        ];
        if let Some((name, _)) = must_be_positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::ConfigError {
                why: format!("{} must be greater than 0", name),
            });
        }
        Ok(())
    }
}

/// Outcome of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub server: NameServer,
    pub query: Query,
    /// Time the task completed, i.e., the nameserver has been checked
    pub checked_at: DateTime<Utc>,
    pub outcome: ResolverResult<Vec<Record>>,
}

impl TaskResult {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn records(&self) -> Option<&[Record]> {
        self.outcome.as_ref().ok().map(Vec::as_slice)
    }

    pub fn error(&self) -> Option<&resolver::Error> {
        self.outcome.as_ref().err()
    }
}

/// Figures of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Tasks handed to the workers
    pub tasks: usize,
    /// Results delivered on the result stream
    pub results: usize,
}

/// Runs nameservers through the worker pool.
///
/// A `Pipeline` may run several times; all runs share the same rate limiter.
pub struct Pipeline {
    resolver: Arc<dyn Resolve>,
    opts: PipelineOpts,
    rate_limiter: Arc<RateLimiter>,
    shutdown: CancellationToken,
}

impl Pipeline {
    pub fn new(resolver: Arc<dyn Resolve>, opts: PipelineOpts) -> Result<Pipeline> {
        opts.validate()?;
        let rate_limiter = Arc::new(RateLimiter::new(opts.rate_interval));

        Ok(Pipeline {
            resolver,
            opts,
            rate_limiter,
            shutdown: CancellationToken::new(),
        })
    }

    /// Cancelling `shutdown` aborts all runs of this pipeline.
    pub fn with_cancellation(self, shutdown: CancellationToken) -> Pipeline {
        Pipeline { shutdown, ..self }
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Checks all nameservers against the canary.
    pub fn check<S>(&self, servers: S) -> Results
    where
        S: Stream<Item = Result<NameServer>> + Send + 'static,
    {
        self.run(servers, self.opts.canary.clone())
    }

    /// Starts a run and returns the stream of results.
    ///
    /// The run is driven by background tasks; the returned `Results` must be consumed to make progress.
    pub fn run<S>(&self, servers: S, query: Query) -> Results
    where
        S: Stream<Item = Result<NameServer>> + Send + 'static,
    {
        let shutdown = self.shutdown.child_token();
        let (task_sender, task_receiver) = mpsc::channel(self.opts.queue_capacity);
        let (result_sender, result_receiver) = mpsc::channel(self.opts.queue_capacity);

        info!(
            "Starting {} run for '{}' with {} workers, rate interval {:?}.",
            self.opts.mode, query, self.opts.concurrency, self.opts.rate_interval
        );

        let feeder = tokio::spawn(tasks::feed(tasks::build(servers, query), task_sender, shutdown.clone()));
        let pool = WorkerPool::spawn(
            self.opts.concurrency,
            self.worker(),
            task_receiver,
            result_sender,
            shutdown.clone(),
        );

        Results {
            receiver: result_receiver,
            feeder,
            pool,
            shutdown,
            received: 0,
        }
    }

    fn worker(&self) -> Worker {
        Worker {
            mode: self.opts.mode,
            prober: Prober::new(
                self.resolver.clone(),
                self.rate_limiter.clone(),
                self.opts.canary.clone(),
                self.opts.check_attempts,
            ),
            executor: QueryExecutor::new(
                self.resolver.clone(),
                self.rate_limiter.clone(),
                self.opts.query_attempts,
            ),
        }
    }
}

/// Stream of the results of one run.
///
/// The stream ends after all workers have terminated. Call `finish` afterwards to learn whether the record
/// source has been read completely.
pub struct Results {
    receiver: mpsc::Receiver<TaskResult>,
    feeder: JoinHandle<Result<usize>>,
    pool: WorkerPool,
    shutdown: CancellationToken,
    received: usize,
}

impl Results {
    /// Number of results received so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Number of workers that have not terminated yet.
    pub fn live_workers(&self) -> usize {
        self.pool.live()
    }

    /// Aborts this run. Workers finish their current step and terminate.
    pub fn cancel(&self) {
        self.shutdown.cancel()
    }

    /// Waits for the run to complete.
    ///
    /// Results not consumed yet are discarded. Fails if the record source failed or the run has been cancelled.
    pub async fn finish(mut self) -> Result<RunStats> {
        while self.receiver.recv().await.is_some() {
            self.received += 1;
        }
        self.pool.join().await;
        let tasks = self.feeder.await??;
        // All tasks may have been handed out before cancellation; their results are then incomplete.
        if self.shutdown.is_cancelled() {
            info!("Run cancelled after {} tasks, {} results.", tasks, self.received);
            return Err(Error::Cancelled);
        }

        info!("Run finished: {} tasks, {} results.", tasks, self.received);
        Ok(RunStats {
            tasks,
            results: self.received,
        })
    }
}

impl Stream for Results {
    type Item = TaskResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let next = this.receiver.poll_recv(cx);
        if let Poll::Ready(Some(_)) = next {
            this.received += 1;
        }
        next
    }
}
