//! Resources
//!
//! Answers returned by nameservers. The record data itself uses hickory's types.

pub use hickory_resolver::proto::rr::RData;
pub use record::Record;

pub mod record;
