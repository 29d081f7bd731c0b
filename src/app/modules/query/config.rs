use std::convert::TryFrom;
use std::path::PathBuf;

use anyhow::Context;
use clap::ArgMatches;

use crate::app::console::ConsoleOpts;
use crate::app::modules::ModConfig;
use crate::app::output::OutputType;
use crate::app::AppConfig;
use crate::query::Query;

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub query: Query,
    pub input: PathBuf,
    pub skip_check: bool,
    pub output: OutputType,
    pub show_errors: bool,
}

impl ModConfig for QueryConfig {
    fn console_opts(&self, app_config: &AppConfig) -> ConsoleOpts {
        // JSON on stdout must not be interleaved with console messages.
        let quiet = app_config.quiet || self.output == OutputType::Json;
        ConsoleOpts::from(app_config)
            .with_quiet(quiet)
            .with_show_errors(self.show_errors)
    }
}

impl TryFrom<&ArgMatches> for QueryConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let domain_name = args
            .get_one::<String>("domain name")
            .context("No domain name to query specified")?;
        let record_type = args
            .get_one::<String>("record type")
            .context("No record type to query specified")?;
        let query = Query::from_strs(domain_name, record_type).context("Failed to build query")?;

        let output = args.get_one::<String>("output").context("No output format specified")?;
        let output = OutputType::try_from(output.as_str()).context("Failed to parse output format")?;

        let config = QueryConfig {
            query,
            input: args
                .get_one::<String>("input")
                .context("No input nameserver list specified")?
                .into(),
            skip_check: args.get_flag("skip-check"),
            output,
            show_errors: args.get_flag("show-errors"),
        };

        Ok(config)
    }
}
