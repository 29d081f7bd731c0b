use crate::app::console::{Console, ConsoleOpts};
use crate::app::{AppConfig, ExitStatus};

pub mod check;
pub mod query;

/** Error type for App modules that go through multiple steps
 *
 * An App module might go through multiple distinct steps to eventually fulfill its task. A step may fail
 * with an error, or it may finish without error but still be unable to provide what the next step needs.
 * In the latter case, the step has already told the user what went wrong and only the `ExitStatus` to
 * terminate with is left.
 *
 * Think of it as a means for early returns.
 */
#[derive(Debug)]
pub enum PartialError {
    Err(anyhow::Error),
    Failed(ExitStatus),
}

impl From<anyhow::Error> for PartialError {
    fn from(err: anyhow::Error) -> Self {
        PartialError::Err(err)
    }
}

impl From<crate::Error> for PartialError {
    fn from(err: crate::Error) -> Self {
        PartialError::Err(err.into())
    }
}

pub type PartialResult<T> = std::result::Result<T, PartialError>;

pub trait PartialResultExt {
    fn into_result(self) -> anyhow::Result<ExitStatus>;
}

impl PartialResultExt for PartialResult<ExitStatus> {
    fn into_result(self) -> anyhow::Result<ExitStatus> {
        match self {
            Ok(exit_status) => Ok(exit_status),
            Err(PartialError::Failed(exit_status)) => Ok(exit_status),
            Err(PartialError::Err(err)) => Err(err),
        }
    }
}

/** Pass environment like configs and console access from step to step
 */
pub struct Environment<'a, T> {
    pub app_config: &'a AppConfig,
    pub mod_config: &'a T,
    pub console: Console,
}

impl<'a, T> Environment<'a, T> {
    pub fn new(app_config: &'a AppConfig, mod_config: &'a T, console: Console) -> Environment<'a, T> {
        Environment {
            app_config,
            mod_config,
            console,
        }
    }
}

pub trait ModConfig {
    fn console_opts(&self, app_config: &AppConfig) -> ConsoleOpts {
        ConsoleOpts::from(app_config)
    }

    /// Console printing to stdout
    fn console(&self, app_config: &AppConfig) -> Console {
        Console::new(self.console_opts(app_config))
    }
}
