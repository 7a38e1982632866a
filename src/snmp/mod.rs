use crate::error::{ProbeError, Result};
use std::{fmt, future::Future, time::Duration};

mod session;
pub use session::SnmpSession;

/// SNMP exchange kinds the collectors issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    GetNext,
    Walk,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "get"),
            Method::GetNext => write!(f, "getnext"),
            Method::Walk => write!(f, "walk"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleValue {
    Integer(i64),
    Text(String),
}

/// One (OID, value) pair returned by a device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub value: SampleValue,
}

impl Sample {
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: SampleValue::Integer(value),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: SampleValue::Text(value.into()),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match &self.value {
            SampleValue::Integer(i) => Ok(*i),
            SampleValue::Text(s) => Err(ProbeError::TypeMismatch {
                oid: self.name.clone(),
                expected: "integer",
                found: format!("text {s:?}"),
            }),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match &self.value {
            SampleValue::Text(s) => Ok(s),
            SampleValue::Integer(i) => Err(ProbeError::TypeMismatch {
                oid: self.name.clone(),
                expected: "text",
                found: format!("integer {i}"),
            }),
        }
    }
}

/// A single SNMP request against a device.
///
/// Implementations return every sample the exchange produced, which may be
/// none at all. Retrying is the caller's business.
pub trait Exchange {
    fn exchange(
        &self,
        target: &str,
        community: &str,
        oid: &str,
        method: Method,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<Sample>>> + Send;
}

/// Strips the optional leading dot some vendor docs put on OIDs.
pub fn normalize_oid(oid: &str) -> &str {
    oid.trim().trim_start_matches('.')
}

/// True when `name` is `base` itself or sits beneath it.
pub fn in_subtree(name: &str, base: &str) -> bool {
    let name = normalize_oid(name);
    let base = normalize_oid(base);
    match name.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
