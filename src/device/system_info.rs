use crate::error::{ProbeError, Result};
use crate::query_engine::QueryEngine;
use crate::snmp::{Exchange, Method};

pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";

/// Fetches sysDescr. Never cached; every call asks the device again.
pub(crate) async fn system_description<E: Exchange>(engine: &QueryEngine<'_, E>) -> Result<String> {
    let samples = engine.query(SYS_DESCR, Method::Get).await?;
    let sample = samples.first().ok_or_else(|| ProbeError::EmptyResponse {
        oid: SYS_DESCR.to_string(),
    })?;
    Ok(sample.as_text()?.to_string())
}
