use thiserror::Error;

/// Failures raised while probing a device.
///
/// Two families live here. Transport failures and unknown vendors are
/// reported to the caller. The remaining kinds describe unusable sample
/// data; the public entry points absorb those into a zero reading.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No collection spec is registered for the classified vendor.
    #[error("{target} switch vendor is not defined")]
    UnrecognizedVendor { target: String },

    /// The device answered with a value of the wrong type.
    #[error("expected {expected} value for {oid}, got {found}")]
    TypeMismatch {
        oid: String,
        expected: &'static str,
        found: String,
    },

    /// A device value pushed the CPU arithmetic out of range.
    #[error("value {value} from {oid} is out of range")]
    OutOfRange { oid: String, value: i64 },

    /// Every attempt came back without a single sample.
    #[error("no samples returned for {oid}")]
    EmptyResponse { oid: String },

    /// None of the master engine probes reported an active engine.
    #[error("no active master engine found under {oid}")]
    NoMasterEngine { oid: String },

    #[error("invalid OID '{0}'")]
    InvalidOid(String),

    #[error("invalid target address '{0}'")]
    InvalidTarget(String),

    #[error("{method} {oid} timed out after {timeout_ms}ms")]
    Timeout {
        method: String,
        oid: String,
        timeout_ms: u128,
    },

    #[error("SNMP transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// True for faults caused by malformed or missing sample data, which the
    /// entry points downgrade to a zero result plus a warning.
    pub fn is_contained(&self) -> bool {
        matches!(
            self,
            ProbeError::TypeMismatch { .. }
                | ProbeError::OutOfRange { .. }
                | ProbeError::EmptyResponse { .. }
                | ProbeError::NoMasterEngine { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
