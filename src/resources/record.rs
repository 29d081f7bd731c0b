// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::hash::{Hash, Hasher};

use hickory_resolver::proto::rr::Name;
use serde::Serialize;

use crate::resources::RData;
use crate::RecordType;

#[derive(Debug, Eq, Clone, Serialize)]
pub struct Record {
    name: Name,
    #[serde(rename = "type")]
    record_type: RecordType,
    ttl: u32,
    data: RData,
}

// TTLs differ between nameservers and even between two responses of the same nameserver, so they do not
// take part in equality.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.record_type == other.record_type && self.data == other.data
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.record_type().hash(state);
        self.canonical().hash(state);
    }
}

impl Record {
    pub fn new(name: Name, ttl: u32, data: RData) -> Record {
        Record {
            name,
            record_type: data.record_type(),
            ttl,
            data,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &RData {
        &self.data
    }

    /// Canonical form of record type and value, e.g., `A 93.184.216.34`. Owner name and TTL are left out, so
    /// the same answer from different nameservers maps to the same string.
    pub fn canonical(&self) -> String {
        format!("{} {}", self.record_type, self.data)
    }
}

#[doc(hidden)]
impl From<&hickory_resolver::proto::rr::Record> for Record {
    fn from(record: &hickory_resolver::proto::rr::Record) -> Self {
        Record {
            name: record.name().clone(),
            record_type: record.record_type(),
            ttl: record.ttl(),
            data: record.data().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    use hickory_resolver::proto::rr::rdata::{A, CNAME};
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn canonical_a() {
        let name = Name::from_str("example.com.").unwrap();
        let record = Record::new(name, 300, RData::A(A(Ipv4Addr::new(93, 184, 216, 34))));

        assert_that(&record.canonical()).is_equal_to("A 93.184.216.34".to_string());
    }

    #[test]
    fn canonical_cname() {
        let name = Name::from_str("www.example.com.").unwrap();
        let target = Name::from_str("example.com.").unwrap();
        let record = Record::new(name, 300, RData::CNAME(CNAME(target)));

        assert_that(&record.canonical()).is_equal_to("CNAME example.com.".to_string());
    }

    #[test]
    fn equality_ignores_ttl() {
        let name = Name::from_str("example.com.").unwrap();
        let data = RData::A(A(Ipv4Addr::new(93, 184, 216, 34)));
        let a = Record::new(name.clone(), 300, data.clone());
        let b = Record::new(name, 17, data);

        assert_that(&a).is_equal_to(&b);
    }
}
