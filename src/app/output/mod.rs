use std::convert::TryFrom;
use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::Error;

pub mod json;
pub mod styles;
pub mod summary;

use json::JsonFormat;
use summary::{SummaryFormat, SummaryFormatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Json,
    Summary,
}

impl TryFrom<&str> for OutputType {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "json" => Ok(OutputType::Json),
            "summary" => Ok(OutputType::Summary),
            _ => Err(Error::ParserError {
                what: value.to_string(),
                to: "OutputType",
                why: "invalid output type".to_string(),
            }),
        }
    }
}

pub trait OutputFormat<T> {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()>;
}

#[derive(Debug)]
pub struct Output {
    output_type: OutputType,
}

impl Output {
    pub fn new(output_type: OutputType) -> Output {
        Output { output_type }
    }
}

impl<T: Serialize + SummaryFormatter> OutputFormat<T> for Output {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        match self.output_type {
            OutputType::Json => JsonFormat::new(true).output(writer, data),
            OutputType::Summary => SummaryFormat.output(writer, data),
        }
    }
}

/// Prints `data` to stdout.
pub fn output<T: Serialize + SummaryFormatter>(output_type: OutputType, data: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Output::new(output_type)
        .output(&mut handle, data)
        .context("Failed to print results to stdout.")
}
