//! Vendor fingerprinting and CPU collection for SNMP-managed network gear.
//!
//! A device's sysDescr decides its [`VendorTag`]; the tag selects an OID and
//! one of a handful of retrieval strategies that turn raw samples into a
//! utilization percentage.

pub mod config;
pub mod device;
pub mod error;
pub mod query_engine;
pub mod snmp;
pub mod target_list;

pub use device::{classify_vendor, cpu_utilization, Connection, Probe, VendorTag};
pub use error::ProbeError;
pub use query_engine::RetryPolicy;
