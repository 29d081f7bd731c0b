// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryInto;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::console::Console;
use crate::app::modules::{ModConfig, PartialResult, PartialResultExt};
use crate::app::{AppConfig, ExitStatus};
use crate::resolver::{HickoryResolve, Resolve};

#[allow(clippy::module_inception)]
mod check;
pub mod config;

use check::Check;
use config::CheckConfig;

pub async fn run(args: &ArgMatches, app_config: &AppConfig, shutdown: CancellationToken) -> Result<ExitStatus> {
    info!("check module selected.");
    let args = args.subcommand_matches("check").context("No arguments for check module")?;
    let config: CheckConfig = args.try_into()?;
    let resolver = Arc::new(HickoryResolve::new(app_config.resolver_opts()));
    let console = config.console(app_config);

    check_nameservers(app_config, &config, console, resolver, shutdown).await
}

/// Checks the input list using `resolver` and writes all valid nameservers to the output list.
pub async fn check_nameservers(
    app_config: &AppConfig,
    config: &CheckConfig,
    console: Console,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> Result<ExitStatus> {
    steps(app_config, config, console, resolver, shutdown).await.into_result()
}

async fn steps(
    app_config: &AppConfig,
    config: &CheckConfig,
    console: Console,
    resolver: Arc<dyn Resolve>,
    shutdown: CancellationToken,
) -> PartialResult<ExitStatus> {
    Check::init(app_config, config, console, resolver, shutdown)?
        .open_lists()
        .await?
        .check()
        .await
}
