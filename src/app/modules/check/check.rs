use std::fs::File;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::console::Console;
use crate::app::modules::check::config::CheckConfig;
use crate::app::modules::{Environment, PartialError, PartialResult};
use crate::app::utils::time;
use crate::app::{AppConfig, ExitStatus};
use crate::nameserver::{NameServerStream, NameServerWriter};
use crate::pipeline::{Mode, Pipeline};
use crate::resolver::Resolve;
use crate::sink::{self, Checked, ValidServers};
use crate::Error;

pub struct Check {}

impl Check {
    pub fn init<'a>(
        app_config: &'a AppConfig,
        config: &'a CheckConfig,
        console: Console,
        resolver: Arc<dyn Resolve>,
        shutdown: CancellationToken,
    ) -> PartialResult<OpenLists<'a>> {
        let env = Environment::new(app_config, config, console);
        let opts = app_config.pipeline_opts(Mode::Check)?;
        env.console.print_opts(&opts, &app_config.resolver_opts());

        let pipeline = Pipeline::new(resolver, opts)
            .context("Failed to set up pipeline")?
            .with_cancellation(shutdown);

        Ok(OpenLists { env, pipeline })
    }
}

pub struct OpenLists<'a> {
    env: Environment<'a, CheckConfig>,
    pipeline: Pipeline,
}

impl<'a> OpenLists<'a> {
    /// Opens the input list and creates the output list; nothing has been probed yet.
    pub async fn open_lists(self) -> PartialResult<RunCheck<'a>> {
        let input = &self.env.mod_config.input;
        let servers = NameServerStream::from_path(input, self.pipeline.opts().queue_capacity)
            .await
            .with_context(|| format!("Failed to load nameservers from '{}'", input.display()))?;

        let writer = match NameServerWriter::create_new(&self.env.mod_config.output) {
            Ok(writer) => writer,
            Err(Error::OutputExists { path }) => {
                self.env
                    .console
                    .error(format!("Output file '{}' already exists. Aborting.", path));
                return Err(PartialError::Failed(ExitStatus::Abort));
            }
            Err(err) => return Err(anyhow::Error::from(err).context("Failed to create output file").into()),
        };

        Ok(RunCheck {
            env: self.env,
            pipeline: self.pipeline,
            servers,
            writer,
        })
    }
}

pub struct RunCheck<'a> {
    env: Environment<'a, CheckConfig>,
    pipeline: Pipeline,
    servers: NameServerStream,
    writer: NameServerWriter<File>,
}

impl<'a> RunCheck<'a> {
    pub async fn check(self) -> PartialResult<ExitStatus> {
        if self.env.console.not_quiet() {
            self.env.console.caption(format!(
                "Checking nameservers from '{}'.",
                self.env.mod_config.input.display()
            ));
        }

        info!("Running nameserver checks.");
        let results = self.pipeline.check(self.servers);
        let res = time(sink::drain(results, ValidServers::new(self.writer))).await;
        info!("Finished nameserver checks.");

        let ((checked, stats), run_time): ((Checked<File>, _), _) = match res {
            Ok(x) => x,
            Err(Error::Cancelled) => {
                self.env.console.attention("Check has been cancelled. Aborting.");
                return Err(PartialError::Failed(ExitStatus::Abort));
            }
            Err(err) => {
                return Err(anyhow::Error::from(err)
                    .context("Failed to check nameservers")
                    .into())
            }
        };

        self.env.console.print_statistics(&stats, run_time);
        self.env.console.ok("Completely checked input file.");
        self.env.console.info(format!("Number of valid servers: {}", checked.valid));
        self.env.console.print_finished();

        Ok(ExitStatus::Ok)
    }
}
