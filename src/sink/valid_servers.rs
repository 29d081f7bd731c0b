use std::io::Write;

use tracing::debug;

use crate::nameserver::NameServerWriter;
use crate::pipeline::TaskResult;
use crate::sink::Sink;
use crate::Result;

/// Writes every valid nameserver, stamped with the time of its check.
pub struct ValidServers<W: Write> {
    writer: NameServerWriter<W>,
    checked: usize,
}

impl<W: Write> ValidServers<W> {
    pub fn new(writer: NameServerWriter<W>) -> ValidServers<W> {
        ValidServers { writer, checked: 0 }
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn valid(&self) -> usize {
        self.writer.written()
    }
}

#[derive(Debug)]
pub struct Checked<W> {
    pub writer: W,
    pub checked: usize,
    pub valid: usize,
}

impl<W: Write> Sink for ValidServers<W> {
    type Output = Checked<W>;

    fn accept(&mut self, result: TaskResult) -> Result<()> {
        self.checked += 1;
        if !result.is_valid() {
            return Ok(());
        }
        debug!("{} is valid.", result.server);
        let server = result.server.with_checked_at(result.checked_at);
        self.writer.write(&server)?;
        self.writer.flush()
    }

    fn finish(self) -> Result<Checked<W>> {
        let valid = self.writer.written();
        let writer = self.writer.finish()?;

        Ok(Checked {
            writer,
            checked: self.checked,
            valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::{TimeZone, Utc};
    use futures::TryStreamExt;
    use spectral::prelude::*;

    use super::*;
    use crate::nameserver::{NameServer, NameServerStream};
    use crate::query::Query;
    use crate::resolver::Error;

    fn result(last_octet: u8, outcome: std::result::Result<(), Error>) -> TaskResult {
        TaskResult {
            server: NameServer::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet)), format!("ns{}", last_octet)),
            query: Query::canary().unwrap(),
            checked_at: Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap(),
            outcome: outcome.map(|_| Vec::new()),
        }
    }

    #[tokio::test]
    async fn only_valid_servers_are_written() {
        let mut sink = ValidServers::new(NameServerWriter::new(Vec::new()).unwrap());

        sink.accept(result(1, Ok(()))).unwrap();
        sink.accept(result(2, Err(Error::Timeout))).unwrap();
        sink.accept(result(3, Ok(()))).unwrap();
        let checked = sink.finish().unwrap();

        assert_that(&checked.checked).is_equal_to(3);
        assert_that(&checked.valid).is_equal_to(2);

        let servers: Vec<NameServer> = NameServerStream::from_reader(Cursor::new(checked.writer), 4)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let names: Vec<_> = servers.iter().map(|s| s.name.as_str()).collect();
        assert_that(&names).is_equal_to(vec!["ns1", "ns3"]);
        assert_that(&servers[0].checked_at).is_equal_to(Some(Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap()));
    }
}
