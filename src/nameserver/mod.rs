use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use list::{NameServerList, NameServerStream, NameServerWriter, HEADER};

pub mod list;

pub const DNS_PORT: u16 = 53;

/// A candidate nameserver as listed by public-dns.info.
///
/// `ip` identifies a nameserver, but duplicates are not removed: each record is checked on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameServer {
    pub ip: IpAddr,
    pub name: String,
    pub country_id: String,
    pub city: String,
    pub reliability: f64,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NameServer {
    pub fn new<S: Into<String>>(ip: IpAddr, name: S) -> NameServer {
        NameServer {
            ip,
            name: name.into(),
            country_id: String::new(),
            city: String::new(),
            reliability: 0.0,
            checked_at: None,
            created_at: None,
        }
    }

    /// Address queries are sent to, i.e., the standard DNS port of `ip`.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, DNS_PORT)
    }

    pub fn with_checked_at(self, checked_at: DateTime<Utc>) -> NameServer {
        NameServer {
            checked_at: Some(checked_at),
            ..self
        }
    }
}

impl fmt::Display for NameServer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.ip {
            IpAddr::V4(ip) => write!(fmt, "{}", ip)?,
            IpAddr::V6(ip) => write!(fmt, "[{}]", ip)?,
        }
        if !self.name.is_empty() {
            write!(fmt, " ({})", self.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::str::FromStr;

    use spectral::prelude::*;

    use super::*;

    #[test]
    fn socket_addr_uses_dns_port() {
        let ns = NameServer::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), "dns.google");

        assert_that(&ns.socket_addr()).is_equal_to(SocketAddr::from(([8, 8, 8, 8], 53)));
    }

    #[test]
    fn display_ipv6() {
        let ns = NameServer::new(
            IpAddr::V6(Ipv6Addr::from_str("2001:4860:4860::8888").unwrap()),
            "dns.google",
        );

        asserting("display brackets ipv6 addresses")
            .that(&ns.to_string().as_str())
            .is_equal_to("[2001:4860:4860::8888] (dns.google)");
    }

    #[test]
    fn display_without_name() {
        let ns = NameServer::new(IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)), "");

        assert_that(&ns.to_string().as_str()).is_equal_to("9.9.9.9");
    }
}
