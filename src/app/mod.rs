pub mod cli_parser;
pub mod config;
pub mod console;
pub mod logging;
pub mod modules;
pub mod output;
pub mod run;
pub mod utils;

pub use config::AppConfig;
pub use run::run;

/// `ExitStatus` represents the exit states that will be return to the OS after termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// All fine.
    Ok = 0,
    /// CLI argument parsing failed.
    CliParsingFailed = 1,
    /// Configuration could not be derived from CLI arguments.
    ConfigParsingFailed = 2,
    /// An unrecoverable error occurred. This is worst case and should not happen.
    UnrecoverableError = 3,
    /// A module failed to properly execute.
    Failed = 10,
    /// A module could not proceed because of invalid preconditions or has been cancelled.
    Abort = 12,
}
