use anyhow::{anyhow, Result};
use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::modules;
use crate::app::{AppConfig, ExitStatus};

pub async fn run(args: &ArgMatches, app_config: &AppConfig) -> Result<ExitStatus> {
    info!("Running command");

    let shutdown = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let res = match args.subcommand_name() {
        Some("check") => modules::check::run(args, app_config, shutdown).await,
        Some("query") => modules::query::run(args, app_config, shutdown).await,
        Some(name) => Err(anyhow!("Unknown command '{}'", name)),
        None => Err(anyhow!("No command given")),
    };
    ctrl_c.abort();

    res
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received Ctrl-C; cancelling.");
            shutdown.cancel();
        }
        Err(err) => warn!("Failed to listen for Ctrl-C: {}", err),
    }
}
