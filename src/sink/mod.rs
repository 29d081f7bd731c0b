//! Consumers of the result stream.

use futures::StreamExt;
use tracing::{debug, warn};

pub use distribution::Distribution;
pub use valid_servers::{Checked, ValidServers};

use crate::pipeline::{Results, RunStats, TaskResult};
use crate::Result;

pub mod distribution;
pub mod valid_servers;

pub trait Sink {
    type Output;

    fn accept(&mut self, result: TaskResult) -> Result<()>;

    /// Called once after the result stream has closed.
    fn finish(self) -> Result<Self::Output>;
}

/// Feeds all results of a run into `sink`.
///
/// The sink is finished even if the record source failed, so everything accepted so far is persisted; the
/// source's error is returned afterwards. If the sink fails, the run is cancelled.
pub async fn drain<S: Sink>(mut results: Results, mut sink: S) -> Result<(S::Output, RunStats)> {
    while let Some(result) = results.next().await {
        if let Err(err) = sink.accept(result) {
            warn!("Sink failed; cancelling run: {}", err);
            results.cancel();
            if let Err(run_err) = results.finish().await {
                debug!("Cancelled run ended with: {}", run_err);
            }
            return Err(err);
        }
    }

    let stats = results.finish().await;
    let output = sink.finish()?;
    let stats = stats?;

    Ok((output, stats))
}
