use std::net::SocketAddr;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::Resolver;
use tracing::trace;

pub use check::Prober;
pub use error::Error;
pub use lookup::QueryExecutor;

use crate::query::Query;
use crate::resources::Record;

pub mod check;
pub mod error;
pub mod lookup;

pub type ResolverResult<T> = std::result::Result<T, Error>;

/// Sends one query to one nameserver.
///
/// Implementations must not retry on their own and must bound the time a single request may take; retries
/// and pacing are the job of `QueryExecutor`.
pub trait Resolve: Send + Sync {
    fn resolve(&self, server: SocketAddr, query: &Query) -> BoxFuture<'static, ResolverResult<Vec<Record>>>;
}

#[derive(Debug, Clone)]
pub struct ResolverOpts {
    /// Time to wait for a response to a single request
    pub timeout: Duration,
}

impl Default for ResolverOpts {
    fn default() -> Self {
        ResolverOpts {
            timeout: Duration::from_secs(5),
        }
    }
}

/// `Resolve` via hickory over UDP.
///
/// Every request uses a fresh, single nameserver resolver without cache, so each call results in exactly
/// one request on the wire.
#[derive(Debug, Clone, Default)]
pub struct HickoryResolve {
    opts: ResolverOpts,
}

impl HickoryResolve {
    pub fn new(opts: ResolverOpts) -> HickoryResolve {
        HickoryResolve { opts }
    }

    pub fn opts(&self) -> &ResolverOpts {
        &self.opts
    }

    fn resolver(&self, server: SocketAddr) -> Resolver<TokioConnectionProvider> {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(server, Protocol::Udp));

        let mut opts = hickory_resolver::config::ResolverOpts::default();
        opts.timeout = self.opts.timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.num_concurrent_reqs = 1;
        opts.ndots = 0;

        Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build()
    }
}

impl Resolve for HickoryResolve {
    fn resolve(&self, server: SocketAddr, query: &Query) -> BoxFuture<'static, ResolverResult<Vec<Record>>> {
        let resolver = self.resolver(server);
        let name = query.name().clone();
        let record_type = query.record_type();

        async move {
            trace!("Sending query for '{}', record type {} to {}.", &name, record_type, server);
            let lookup = resolver.lookup(name, record_type).await?;
            let records: Vec<Record> = lookup.record_iter().map(Record::from).collect();
            Ok::<_, Error>(records)
        }
        .boxed()
    }
}
