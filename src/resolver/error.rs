use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::{ProtoError, ProtoErrorKind};
use hickory_resolver::{ResolveError, ResolveErrorKind};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

use crate::rate_limit::Cancelled;

/// Outcome of a failed lookup against one nameserver.
///
/// These errors never abort a run; they are recorded in the corresponding `TaskResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Error {
    #[error("nameserver refused query")]
    QueryRefused,
    #[error("nameserver responded with server failure")]
    ServerFailure,
    #[error("request timed out")]
    Timeout,
    #[error("nameserver returned no answer")]
    NoAnswer,
    #[error("nameserver failed the canary check")]
    InvalidServer,
    #[error("resolver error: {reason}")]
    ResolveError { reason: String },
    #[error("protocol error: {reason}")]
    ProtoError { reason: String },
    #[error("query has been cancelled")]
    Cancelled,
    #[error("query execution panicked")]
    RuntimePanicError,
}

impl Error {
    /// Short, stable name of the kind of error; used to count errors by kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::QueryRefused => "refused",
            Error::ServerFailure => "servfail",
            Error::Timeout => "timeout",
            Error::NoAnswer => "no answer",
            Error::InvalidServer => "invalid server",
            Error::ResolveError { .. } => "resolver error",
            Error::ProtoError { .. } => "protocol error",
            Error::Cancelled => "cancelled",
            Error::RuntimePanicError => "panic",
        }
    }
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        match error.kind() {
            ResolveErrorKind::Proto(proto_error) => Self::from(proto_error),
            _ => Error::ResolveError {
                reason: error.to_string(),
            },
        }
    }
}

impl From<&ProtoError> for Error {
    fn from(error: &ProtoError) -> Self {
        match error.kind() {
            ProtoErrorKind::Timeout => Error::Timeout,
            ProtoErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
                ResponseCode::Refused => Error::QueryRefused,
                ResponseCode::ServFail => Error::ServerFailure,
                _ => Error::NoAnswer,
            },
            _ => Error::ProtoError {
                reason: error.to_string(),
            },
        }
    }
}

impl From<ProtoError> for Error {
    fn from(error: ProtoError) -> Self {
        Self::from(&error)
    }
}

impl From<JoinError> for Error {
    fn from(error: JoinError) -> Self {
        if error.is_cancelled() {
            return Error::Cancelled;
        }
        Error::RuntimePanicError
    }
}

impl From<Cancelled> for Error {
    fn from(_: Cancelled) -> Self {
        Error::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn timeout_from_proto_error() {
        let error = ProtoError::from(ProtoErrorKind::Timeout);

        assert_that(&Error::from(error)).is_equal_to(Error::Timeout);
    }

    #[test]
    fn other_proto_errors_keep_reason() {
        let error = ProtoError::from("malformed message");

        let error = Error::from(error);

        assert_that(&matches!(error, Error::ProtoError { .. })).is_true();
        assert_that(&error.to_string()).contains("malformed message");
    }

    #[test]
    fn kind_names_are_distinct() {
        let errors = vec![
            Error::QueryRefused,
            Error::ServerFailure,
            Error::Timeout,
            Error::NoAnswer,
            Error::InvalidServer,
            Error::ResolveError { reason: String::new() },
            Error::ProtoError { reason: String::new() },
            Error::Cancelled,
            Error::RuntimePanicError,
        ];

        let names: std::collections::HashSet<_> = errors.iter().map(Error::kind_name).collect();

        assert_that(&names.len()).is_equal_to(errors.len());
    }
}
