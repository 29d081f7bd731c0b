//! nscheck validates large lists of public nameservers and queries all of them concurrently.
//!
//! Nameserver records are streamed from a CSV list, paired with a query and handed to a bounded
//! pool of workers. Every worker paces its network attempts through one shared rate limiter,
//! checks the nameserver with a canary lookup and optionally runs the actual query. Results are
//! streamed to a sink which either keeps the valid nameservers or aggregates the answers.

pub use hickory_resolver::proto::rr::RecordType;

pub use error::Error;
pub use nameserver::NameServer;
pub use pipeline::{Mode, Pipeline, PipelineOpts, TaskResult};
pub use query::Query;

#[cfg(feature = "app-cli")]
pub mod app;
pub mod error;
pub mod nameserver;
pub mod pipeline;
pub mod query;
pub mod rate_limit;
pub mod resolver;
pub mod resources;
pub mod sink;

pub type Result<T> = std::result::Result<T, Error>;
