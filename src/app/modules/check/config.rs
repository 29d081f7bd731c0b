use std::convert::TryFrom;
use std::path::PathBuf;

use anyhow::Context;
use clap::ArgMatches;

use crate::app::modules::ModConfig;

#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ModConfig for CheckConfig {}

impl TryFrom<&ArgMatches> for CheckConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let config = CheckConfig {
            input: args
                .get_one::<String>("input")
                .context("No input nameserver list specified")?
                .into(),
            output: args
                .get_one::<String>("output")
                .context("No output nameserver list specified")?
                .into(),
        };

        Ok(config)
    }
}
