// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
/// Main Error type of this crate.
///
/// Errors of single lookups never show up here; they are part of the corresponding `TaskResult`.
pub enum Error {
    #[error("internal error: {msg}")]
    InternalError { msg: &'static str },
    #[error("failed to load nameserver list: {why}")]
    LoadError { why: String },
    #[error("failed to decode nameserver record {record}: {why}")]
    DecodeError { record: u64, why: String },
    #[error("failed to encode nameserver record")]
    EncodeError {
        #[from]
        source: csv::Error,
    },
    #[error("output file '{path}' already exists")]
    OutputExists { path: String },
    #[error("failed to parse '{what}' to {to} because {why}")]
    ParserError {
        what: String,
        to: &'static str,
        why: String,
    },
    #[error("invalid configuration: {why}")]
    ConfigError { why: String },
    #[error("run has been cancelled")]
    Cancelled,
    #[error("failed to execute IO operation")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn decode(record: u64, error: csv::Error) -> Error {
        let why = match error.kind() {
            csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
            _ => error.to_string(),
        };
        Error::DecodeError { record, why }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        if error.is_cancelled() {
            return Error::Cancelled;
        }
        Error::InternalError {
            msg: "background task panicked",
        }
    }
}
