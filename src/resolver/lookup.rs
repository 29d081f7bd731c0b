use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::nameserver::NameServer;
use crate::query::Query;
use crate::rate_limit::RateLimiter;
use crate::resolver::{Error, Resolve, ResolverResult};
use crate::resources::Record;

/// Runs a query against a nameserver with a bounded number of attempts.
///
/// Each attempt first waits for a pace slot of the shared `RateLimiter`. The first attempt that returns at
/// least one record ends the lookup. Attempts follow each other without additional delay.
#[derive(Clone)]
pub struct QueryExecutor {
    resolver: Arc<dyn Resolve>,
    rate_limiter: Arc<RateLimiter>,
    attempts: usize,
}

impl QueryExecutor {
    pub fn new(resolver: Arc<dyn Resolve>, rate_limiter: Arc<RateLimiter>, attempts: usize) -> QueryExecutor {
        QueryExecutor {
            resolver,
            rate_limiter,
            attempts,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Returns the first non-empty answer. If all attempts fail or come back empty, the error of the last
    /// failed attempt is returned, or `Error::NoAnswer` if no attempt failed.
    pub async fn execute(
        &self,
        server: &NameServer,
        query: &Query,
        shutdown: &CancellationToken,
    ) -> ResolverResult<Vec<Record>> {
        let server_addr = server.socket_addr();
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            self.rate_limiter.acquire_or_cancel(shutdown).await?;
            trace!(
                "Attempt {}/{} for '{}' at {}.",
                attempt,
                self.attempts,
                query,
                server
            );

            match self.single_attempt(server_addr, query, shutdown).await {
                Ok(records) if !records.is_empty() => {
                    debug!(
                        "Lookup for '{}' at {} returned {} records in attempt {}.",
                        query,
                        server,
                        records.len(),
                        attempt
                    );
                    return Ok(records);
                }
                Ok(_) => trace!("Lookup for '{}' at {} returned no records.", query, server),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    trace!("Lookup for '{}' at {} failed: {}", query, server, err);
                    last_error = Some(err);
                }
            }
        }

        let err = last_error.unwrap_or(Error::NoAnswer);
        debug!(
            "Lookup for '{}' at {} failed after {} attempts: {}",
            query, server, self.attempts, err
        );
        Err(err)
    }

    // The request runs in its own task, so a panicking resolver only fails this attempt.
    async fn single_attempt(
        &self,
        server: SocketAddr,
        query: &Query,
        shutdown: &CancellationToken,
    ) -> ResolverResult<Vec<Record>> {
        let mut request = task::spawn(self.resolver.resolve(server, query));

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                request.abort();
                Err(Error::Cancelled)
            }
            res = &mut request => res?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use spectral::prelude::*;

    use super::*;
    use crate::utils::tests::resolver::{Behavior, ScriptedResolve};
    use crate::RecordType;

    fn server(last_octet: u8) -> NameServer {
        NameServer::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet)), "test")
    }

    fn query() -> Query {
        Query::new("example.com", RecordType::A).unwrap()
    }

    fn executor(resolver: Arc<ScriptedResolve>, attempts: usize) -> QueryExecutor {
        QueryExecutor::new(resolver, Arc::new(RateLimiter::new(Duration::ZERO)), attempts)
    }

    #[tokio::test]
    async fn first_answer_wins() {
        crate::utils::tests::logging::init();
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Answer(vec![Ipv4Addr::new(93, 184, 216, 34)])));
        let executor = executor(resolver.clone(), 3);
        let server = server(1);

        let res = executor.execute(&server, &query(), &CancellationToken::new()).await;

        assert_that(&res).is_ok().has_length(1);
        assert_that(&resolver.attempts(server.ip)).is_equal_to(1);
    }

    #[tokio::test]
    async fn retry_ceiling_is_respected() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Fail(Error::Timeout)));
        let executor = executor(resolver.clone(), 3);
        let server = server(2);

        let res = executor.execute(&server, &query(), &CancellationToken::new()).await;

        assert_that(&res).is_err().is_equal_to(Error::Timeout);
        assert_that(&resolver.attempts(server.ip)).is_equal_to(3);
    }

    #[tokio::test]
    async fn success_in_last_attempt() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::FailTimes(2, Ipv4Addr::new(1, 2, 3, 4))));
        let executor = executor(resolver.clone(), 3);
        let server = server(3);

        let res = executor.execute(&server, &query(), &CancellationToken::new()).await;

        assert_that(&res).is_ok();
        assert_that(&resolver.attempts(server.ip)).is_equal_to(3);
    }

    #[tokio::test]
    async fn empty_answers_yield_no_answer() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Empty));
        let executor = executor(resolver.clone(), 3);
        let server = server(4);

        let res = executor.execute(&server, &query(), &CancellationToken::new()).await;

        assert_that(&res).is_err().is_equal_to(Error::NoAnswer);
        assert_that(&resolver.attempts(server.ip)).is_equal_to(3);
    }

    #[tokio::test]
    async fn last_error_is_returned() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Fail(Error::QueryRefused)));
        let executor = executor(resolver, 2);

        let res = executor.execute(&server(5), &query(), &CancellationToken::new()).await;

        assert_that(&res).is_err().is_equal_to(Error::QueryRefused);
    }

    #[tokio::test]
    async fn panicking_resolver_fails_attempt() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Panic));
        let executor = executor(resolver.clone(), 2);
        let server = server(6);

        let res = executor.execute(&server, &query(), &CancellationToken::new()).await;

        assert_that(&res).is_err().is_equal_to(Error::RuntimePanicError);
        assert_that(&resolver.attempts(server.ip)).is_equal_to(2);
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_request() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Hang));
        let executor = executor(resolver, 5);
        let shutdown = CancellationToken::new();

        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let res = executor.execute(&server(7), &query(), &shutdown).await;

        assert_that(&res).is_err().is_equal_to(Error::Cancelled);
    }

    #[tokio::test]
    async fn every_attempt_takes_a_pace_slot() {
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Fail(Error::Timeout)));
        let rate_limiter = Arc::new(RateLimiter::new(Duration::ZERO));
        let executor = QueryExecutor::new(resolver, rate_limiter.clone(), 4);

        let _ = executor.execute(&server(8), &query(), &CancellationToken::new()).await;

        assert_that(&rate_limiter.issued()).is_equal_to(4);
    }
}
