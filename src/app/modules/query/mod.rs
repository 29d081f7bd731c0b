use std::convert::TryInto;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::console::Console;
use crate::app::modules::{ModConfig, PartialError, PartialResult};
use crate::app::{AppConfig, ExitStatus};
use crate::resolver::{HickoryResolve, Resolve};
use crate::sink::Distribution;

pub mod config;
#[allow(clippy::module_inception)]
mod query;

use config::QueryConfig;
use query::QueryNameServers;

pub async fn run(args: &ArgMatches, app_config: &AppConfig, shutdown: CancellationToken) -> Result<ExitStatus> {
    info!("query module selected.");
    let args = args.subcommand_matches("query").context("No arguments for query module")?;
    let config: QueryConfig = args.try_into()?;
    let resolver = Arc::new(HickoryResolve::new(app_config.resolver_opts()));
    let console = config.console(app_config);

    query_nameservers(app_config, &config, console, resolver, shutdown)
        .await
        .map(|(exit_status, _)| exit_status)
}

/// Queries all nameservers of the input list using `resolver` and prints the distribution of answers.
///
/// The distribution is returned unless the run has been aborted.
pub async fn query_nameservers(
    app_config: &AppConfig,
    config: &QueryConfig,
    console: Console,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> Result<(ExitStatus, Option<Distribution>)> {
    match steps(app_config, config, console, resolver, shutdown).await {
        Ok((exit_status, distribution)) => Ok((exit_status, Some(distribution))),
        Err(PartialError::Failed(exit_status)) => Ok((exit_status, None)),
        Err(PartialError::Err(err)) => Err(err),
    }
}

async fn steps(
    app_config: &AppConfig,
    config: &QueryConfig,
    console: Console,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> PartialResult<(ExitStatus, Distribution)> {
    QueryNameServers::init(app_config, config, console, resolver, shutdown)?
        .open_list()
        .await?
        .query()
        .await?
        .output()
}
