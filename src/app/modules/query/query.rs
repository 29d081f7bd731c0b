use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::console::Console;
use crate::app::modules::query::config::QueryConfig;
use crate::app::modules::{Environment, PartialError, PartialResult};
use crate::app::output::{self, OutputType};
use crate::app::utils::time;
use crate::app::{AppConfig, ExitStatus};
use crate::nameserver::NameServerStream;
use crate::pipeline::{Mode, Pipeline, RunStats};
use crate::resolver::Resolve;
use crate::sink::{self, Distribution};
use crate::Error;

pub struct QueryNameServers {}

impl QueryNameServers {
    pub fn init<'a>(
        app_config: &'a AppConfig,
        config: &'a QueryConfig,
        console: Console,
        resolver: Arc<dyn Resolve>,
        shutdown: CancellationToken,
    ) -> PartialResult<OpenList<'a>> {
        let env = Environment::new(app_config, config, console);
        let mode = if config.skip_check {
            Mode::Query
        } else {
            Mode::CheckThenQuery
        };
        let opts = app_config.pipeline_opts(mode)?;
        env.console.print_opts(&opts, &app_config.resolver_opts());

        let pipeline = Pipeline::new(resolver, opts)
            .context("Failed to set up pipeline")?
            .with_cancellation(shutdown);

        Ok(OpenList { env, pipeline })
    }
}

pub struct OpenList<'a> {
    env: Environment<'a, QueryConfig>,
    pipeline: Pipeline,
}

impl<'a> OpenList<'a> {
    pub async fn open_list(self) -> PartialResult<RunQuery<'a>> {
        let input = &self.env.mod_config.input;
        let servers = NameServerStream::from_path(input, self.pipeline.opts().queue_capacity)
            .await
            .with_context(|| format!("Failed to load nameservers from '{}'", input.display()))?;

        Ok(RunQuery {
            env: self.env,
            pipeline: self.pipeline,
            servers,
        })
    }
}

pub struct RunQuery<'a> {
    env: Environment<'a, QueryConfig>,
    pipeline: Pipeline,
    servers: NameServerStream,
}

impl<'a> RunQuery<'a> {
    pub async fn query(self) -> PartialResult<OutputDistribution<'a>> {
        let query = self.env.mod_config.query.clone();
        if self.env.console.not_quiet() {
            self.env
                .console
                .caption(format!("Querying all nameservers for '{}'.", query));
        }

        info!("Running queries.");
        let results = self.pipeline.run(self.servers, query);
        let res = time(sink::drain(results, Distribution::new())).await;
        info!("Finished queries.");

        let ((distribution, stats), run_time) = match res {
            Ok(x) => x,
            Err(Error::Cancelled) => {
                self.env.console.attention("Queries have been cancelled. Aborting.");
                return Err(PartialError::Failed(ExitStatus::Abort));
            }
            Err(err) => return Err(anyhow::Error::from(err).context("Failed to query nameservers").into()),
        };

        Ok(OutputDistribution {
            env: self.env,
            distribution,
            stats,
            run_time,
        })
    }
}

pub struct OutputDistribution<'a> {
    env: Environment<'a, QueryConfig>,
    distribution: Distribution,
    stats: RunStats,
    run_time: Duration,
}

impl<'a> OutputDistribution<'a> {
    pub fn output(self) -> PartialResult<(ExitStatus, Distribution)> {
        self.env.console.print_statistics(&self.stats, self.run_time);

        let output_type = self.env.mod_config.output;
        output::output(output_type, &self.distribution)?;

        if output_type == OutputType::Summary {
            self.env.console.info(format!(
                "Successful: {} out of {} ({:.1}%)",
                self.distribution.succeeded(),
                self.distribution.attempted(),
                self.distribution.success_ratio() * 100.0
            ));
        }
        self.env.console.print_error_counts(self.distribution.errors());
        self.env.console.print_finished();

        Ok((ExitStatus::Ok, self.distribution))
    }
}
