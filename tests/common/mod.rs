#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};
use hickory_resolver::proto::rr::rdata::A;

use nscheck::nameserver::HEADER;
use nscheck::resolver::{Error, Resolve, ResolverResult};
use nscheck::resources::{RData, Record};
use nscheck::Query;

pub const EXAMPLE_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

/// Nameservers answering every query with `EXAMPLE_IP` unless told to time out or hang.
#[derive(Debug, Default)]
pub struct MockResolve {
    timing_out: Vec<IpAddr>,
    hanging: Vec<IpAddr>,
    requests: Mutex<HashMap<IpAddr, usize>>,
}

impl MockResolve {
    pub fn new() -> MockResolve {
        Default::default()
    }

    pub fn timing_out(mut self, ip: IpAddr) -> MockResolve {
        self.timing_out.push(ip);
        self
    }

    pub fn hanging(mut self, ip: IpAddr) -> MockResolve {
        self.hanging.push(ip);
        self
    }

    pub fn requests(&self, ip: IpAddr) -> usize {
        self.requests.lock().unwrap().get(&ip).copied().unwrap_or(0)
    }
}

impl Resolve for MockResolve {
    fn resolve(&self, server: SocketAddr, query: &Query) -> BoxFuture<'static, ResolverResult<Vec<Record>>> {
        *self.requests.lock().unwrap().entry(server.ip()).or_insert(0) += 1;

        if self.hanging.contains(&server.ip()) {
            return future::pending().boxed();
        }
        let res = if self.timing_out.contains(&server.ip()) {
            Err(Error::Timeout)
        } else {
            Ok(vec![Record::new(query.name().clone(), 300, RData::A(A(EXAMPLE_IP)))])
        };
        future::ready(res).boxed()
    }
}

pub fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
}

/// Writes a nameserver list with one record per ip.
pub fn write_list<P: AsRef<Path>>(path: P, ips: &[IpAddr]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{}", HEADER.join(",")).unwrap();
    for (i, ip) in ips.iter().enumerate() {
        writeln!(file, "{},ns{}.example.net,DE,Berlin,1.00,,", ip, i + 1).unwrap();
    }
}

/// Console output captured for assertions.
#[derive(Debug, Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
