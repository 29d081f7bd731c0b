use std::convert::TryFrom;
use std::env;

use clap::ArgMatches;
use tracing::{debug, info};

use nscheck::app::cli_parser::create_parser;
use nscheck::app::logging::Logging;
use nscheck::app::output::styles;
use nscheck::app::{self, AppConfig, ExitStatus};

#[tokio::main]
async fn main() {
    let args = match create_parser().try_get_matches() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version end up here, too.
            let _ = err.print();
            let exit_status = if err.use_stderr() {
                ExitStatus::CliParsingFailed
            } else {
                ExitStatus::Ok
            };
            std::process::exit(exit_status as i32);
        }
    };

    let exit_status = match AppConfig::try_from(&args) {
        Ok(app_config) => run(&args, &app_config).await,
        Err(err) => {
            eprintln!("Failed to parse configuration: {:#}", err);
            ExitStatus::ConfigParsingFailed
        }
    };

    std::process::exit(exit_status as i32);
}

async fn run(args: &ArgMatches, app_config: &AppConfig) -> ExitStatus {
    if app_config.no_color {
        styles::no_color_mode();
    }
    if app_config.ascii_only {
        styles::ascii_mode();
    }

    let logging = Logging::new(
        app_config.verbosity,
        env::var_os("RUST_LOG"),
        !app_config.no_color,
        app_config.debug,
    );
    if let Err(err) = logging.start() {
        eprintln!("Failed to start logging: {:#}", err);
        return ExitStatus::UnrecoverableError;
    }
    info!("{} version={}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    debug!("Parsed args and set up logging.");

    match app::run(args, app_config).await {
        Ok(exit_status) => {
            info!("Exit status: {:?}", exit_status);
            exit_status
        }
        Err(err) => {
            eprintln!("Failed: {:#}", err);
            ExitStatus::Failed
        }
    }
}
