// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::pipeline::{Mode, PipelineOpts};
use crate::query::{Query, DEFAULT_CANARY_NAME};
use crate::resolver::ResolverOpts;
use crate::RecordType;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub verbosity: u8,
    pub quiet: bool,
    pub no_color: bool,
    pub ascii_only: bool,
    pub debug: bool,
    /// Number of workers; the pipeline's default for the mode if not set
    pub concurrency: Option<usize>,
    pub rate_interval: Duration,
    pub timeout: Duration,
    pub check_attempts: usize,
    pub query_attempts: usize,
    pub canary: String,
}

impl AppConfig {
    pub fn pipeline_opts(&self, mode: Mode) -> Result<PipelineOpts> {
        let canary = Query::new(&self.canary, RecordType::A).context("Failed to parse canary name")?;
        let mut opts = PipelineOpts::new(mode)?
            .with_rate_interval(self.rate_interval)
            .with_check_attempts(self.check_attempts)
            .with_query_attempts(self.query_attempts)
            .with_canary(canary);
        if let Some(concurrency) = self.concurrency {
            opts = opts.with_concurrency(concurrency);
        }
        opts.validate().context("Invalid pipeline options")?;

        Ok(opts)
    }

    pub fn resolver_opts(&self) -> ResolverOpts {
        ResolverOpts { timeout: self.timeout }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            verbosity: 0,
            quiet: false,
            no_color: false,
            ascii_only: false,
            debug: false,
            concurrency: None,
            rate_interval: Duration::from_millis(10),
            timeout: ResolverOpts::default().timeout,
            check_attempts: 5,
            query_attempts: 3,
            canary: DEFAULT_CANARY_NAME.to_string(),
        }
    }
}

impl TryFrom<&ArgMatches> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        // Global args are propagated to the selected subcommand.
        let args = args.subcommand().map(|(_, args)| args).unwrap_or(args);

        let config = AppConfig {
            verbosity: args.get_count("v"),
            quiet: args.get_flag("quiet"),
            no_color: args.get_flag("no-color"),
            ascii_only: args.get_flag("ascii"),
            debug: args.get_flag("debug"),
            concurrency: args.get_one::<usize>("concurrency").copied(),
            rate_interval: *args
                .get_one::<Duration>("rate-interval")
                .context("No rate interval specified")?,
            timeout: *args.get_one::<Duration>("timeout").context("No timeout specified")?,
            check_attempts: *args
                .get_one::<usize>("check-attempts")
                .context("No number of check attempts specified")?,
            query_attempts: *args
                .get_one::<usize>("query-attempts")
                .context("No number of query attempts specified")?,
            canary: args
                .get_one::<String>("canary")
                .context("No canary name specified")?
                .to_string(),
        };

        Ok(config)
    }
}
