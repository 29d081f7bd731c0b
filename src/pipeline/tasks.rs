use futures::{pin_mut, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::nameserver::NameServer;
use crate::query::Query;
use crate::{Error, Result};

/// One nameserver paired with one query; the unit of work of the worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub server: NameServer,
    pub query: Query,
}

/// Pairs every nameserver with `query`, preserving the order of `servers`.
///
/// Errors of the source are passed through, so the consumer decides when to stop.
pub fn build<S>(servers: S, query: Query) -> impl Stream<Item = Result<Task>> + Send + 'static
where
    S: Stream<Item = Result<NameServer>> + Send + 'static,
{
    servers.map(move |server| {
        server.map(|server| Task {
            server,
            query: query.clone(),
        })
    })
}

/// Pushes tasks into `sender` until the stream ends, fails or `shutdown` fires.
///
/// Returns the number of tasks handed to the workers. The sender is dropped on return, which closes the task
/// queue for the workers in every case.
pub(crate) async fn feed<S>(tasks: S, sender: mpsc::Sender<Task>, shutdown: CancellationToken) -> Result<usize>
where
    S: Stream<Item = Result<Task>>,
{
    pin_mut!(tasks);
    let mut fed = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(Error::Cancelled),
            next = tasks.next() => next,
        };
        let task = match next {
            Some(Ok(task)) => task,
            Some(Err(err)) => {
                debug!("Task source failed after {} tasks: {}", fed, err);
                return Err(err);
            }
            None => break,
        };
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(Error::Cancelled),
            sent = sender.send(task) => {
                if sent.is_err() {
                    debug!("All workers are gone; stopping to feed tasks.");
                    break;
                }
            }
        }
        fed += 1;
    }
    info!("Fed {} tasks to workers.", fed);

    Ok(fed)
}
