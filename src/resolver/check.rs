use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::nameserver::NameServer;
use crate::query::Query;
use crate::rate_limit::RateLimiter;
use crate::resolver::{QueryExecutor, Resolve, ResolverResult};
use crate::resources::Record;

/// Decides whether a nameserver is usable by resolving a well-known canary name against it.
#[derive(Clone)]
pub struct Prober {
    executor: QueryExecutor,
    canary: Query,
}

impl Prober {
    pub fn new(resolver: Arc<dyn Resolve>, rate_limiter: Arc<RateLimiter>, canary: Query, attempts: usize) -> Prober {
        Prober {
            executor: QueryExecutor::new(resolver, rate_limiter, attempts),
            canary,
        }
    }

    pub fn canary(&self) -> &Query {
        &self.canary
    }

    pub fn attempts(&self) -> usize {
        self.executor.attempts()
    }

    /// Resolves the canary; a server is valid iff this returns at least one record.
    pub async fn check(&self, server: &NameServer, shutdown: &CancellationToken) -> ResolverResult<Vec<Record>> {
        self.executor.execute(server, &self.canary, shutdown).await
    }

    pub async fn is_valid(&self, server: &NameServer, shutdown: &CancellationToken) -> bool {
        self.check(server, shutdown).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use spectral::prelude::*;

    use super::*;
    use crate::resolver::Error;
    use crate::utils::tests::resolver::{Behavior, ScriptedResolve};

    fn prober(resolver: Arc<ScriptedResolve>) -> Prober {
        Prober::new(
            resolver,
            Arc::new(RateLimiter::new(Duration::ZERO)),
            Query::canary().unwrap(),
            5,
        )
    }

    #[tokio::test]
    async fn unreachable_server_is_tried_exactly_five_times() {
        let ip = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Fail(Error::Timeout)));
        let prober = prober(resolver.clone());

        let valid = prober
            .is_valid(&NameServer::new(ip, "unreachable"), &CancellationToken::new())
            .await;

        assert_that(&valid).is_false();
        assert_that(&resolver.attempts(ip)).is_equal_to(5);
    }

    #[tokio::test]
    async fn success_in_fifth_attempt_is_valid() {
        let ip = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 2));
        let resolver = Arc::new(ScriptedResolve::new(Behavior::FailTimes(4, Ipv4Addr::new(54, 239, 28, 85))));
        let prober = prober(resolver.clone());

        let res = prober.check(&NameServer::new(ip, "flaky"), &CancellationToken::new()).await;

        assert_that(&res).is_ok().has_length(1);
        assert_that(&resolver.attempts(ip)).is_equal_to(5);
    }

    #[tokio::test]
    async fn empty_canary_answer_is_invalid() {
        let ip = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 3));
        let resolver = Arc::new(ScriptedResolve::new(Behavior::Empty));
        let prober = prober(resolver);

        let res = prober.check(&NameServer::new(ip, "empty"), &CancellationToken::new()).await;

        assert_that(&res).is_err().is_equal_to(Error::NoAnswer);
    }
}
