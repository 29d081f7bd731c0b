use std::fmt;
use std::str::FromStr;

use hickory_resolver::proto::rr::Name;
use serde::Serialize;

use crate::error::Error;
use crate::{RecordType, Result};

/// Name that every working public nameserver must be able to resolve.
pub static DEFAULT_CANARY_NAME: &str = "www.amazon.com";

/// Query
///
/// The name is always fully qualified, i.e., it carries the trailing root label. Name's labels are
/// all Rc, so clone is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    pub(crate) name: Name,
    pub(crate) record_type: RecordType,
}

impl Query {
    pub fn new(name: &str, record_type: RecordType) -> Result<Query> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Err(Error::ParserError {
                what: name.to_string(),
                to: "Name",
                why: "name is empty".to_string(),
            });
        }
        let mut name = Name::from_ascii(trimmed).map_err(|e| Error::ParserError {
            what: trimmed.to_string(),
            to: "Name",
            why: e.to_string(),
        })?;
        name.set_fqdn(true);

        Ok(Query { name, record_type })
    }

    /// Parses the record type case insensitively, e.g., `aaaa` or `CNAME`.
    pub fn from_strs(name: &str, record_type: &str) -> Result<Query> {
        let record_type = RecordType::from_str(&record_type.to_uppercase()).map_err(|e| Error::ParserError {
            what: record_type.to_string(),
            to: "RecordType",
            why: e.to_string(),
        })?;
        Query::new(name, record_type)
    }

    /// The canary query `www.amazon.com. A`.
    pub fn canary() -> Result<Query> {
        Query::new(DEFAULT_CANARY_NAME, RecordType::A)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.record_type)
    }
}
