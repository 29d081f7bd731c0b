// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;

use anyhow::Result;
use tabwriter::TabWriter;

use super::styles::itemization_prefix;
use super::OutputFormat;
use crate::sink::Distribution;
use crate::Error;

#[derive(Debug, Default)]
pub struct SummaryFormat;

pub trait SummaryFormatter {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl<T: SummaryFormatter> OutputFormat<T> for SummaryFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        data.output(writer)
    }
}

impl SummaryFormatter for Distribution {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut tw = TabWriter::new(vec![]);

        for (answer, count) in self.sorted() {
            let share = 100.0 * count as f64 / self.attempted() as f64;
            writeln!(tw, " {} {}\t{}\t({:.1}%)", itemization_prefix(), answer, count, share)?;
        }

        let text_buffer = tw.into_inner().map_err(|_| Error::InternalError {
            msg: "finish TabWriter buffer",
        })?;
        let out = String::from_utf8(text_buffer).map_err(|_| Error::InternalError {
            msg: "convert TabWriter buffer to output",
        })?;
        write!(writer, "{}", out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::Utc;
    use hickory_resolver::proto::rr::rdata::A;
    use spectral::prelude::*;

    use super::*;
    use crate::nameserver::NameServer;
    use crate::pipeline::TaskResult;
    use crate::query::Query;
    use crate::resolver;
    use crate::resources::{RData, Record};
    use crate::sink::Sink;
    use crate::RecordType;

    fn result(answer: Option<Ipv4Addr>) -> TaskResult {
        let query = Query::new("example.com", RecordType::A).unwrap();
        let outcome = match answer {
            Some(ip) => Ok(vec![Record::new(query.name().clone(), 60, RData::A(A(ip)))]),
            None => Err(resolver::Error::Timeout),
        };
        TaskResult {
            server: NameServer::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), "ns"),
            query,
            checked_at: Utc::now(),
            outcome,
        }
    }

    #[test]
    fn summary_lists_answers_by_count() {
        let mut distribution = Distribution::new();
        distribution.accept(result(Some(Ipv4Addr::new(10, 0, 0, 1)))).unwrap();
        distribution.accept(result(Some(Ipv4Addr::new(10, 0, 0, 2)))).unwrap();
        distribution.accept(result(Some(Ipv4Addr::new(10, 0, 0, 2)))).unwrap();
        distribution.accept(result(None)).unwrap();

        let mut buf = Vec::new();
        SummaryFormat.output(&mut buf, &distribution).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_that(&lines).has_length(2);
        assert_that(&lines[0]).contains("A 10.0.0.2");
        assert_that(&lines[0]).contains("(50.0%)");
        assert_that(&lines[1]).contains("A 10.0.0.1");
    }
}
