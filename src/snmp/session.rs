use super::{in_subtree, normalize_oid, Exchange, Method, Sample, SampleValue};
use crate::error::{ProbeError, Result};
use snmp2::{AsyncSession, Oid, Value};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use tracing::trace;

const SNMP_PORT: u16 = 161;
// Setting this to large numbers breaks on Mikrotik
const MAX_REPEAT: u32 = 20;

/// SNMP v2c transport. Opens a fresh session for every exchange, so nothing
/// is shared between calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnmpSession;

impl Exchange for SnmpSession {
    async fn exchange(
        &self,
        target: &str,
        community: &str,
        oid: &str,
        method: Method,
        timeout: Duration,
    ) -> Result<Vec<Sample>> {
        match tokio::time::timeout(timeout, run(target, community, oid, method)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                method: method.to_string(),
                oid: oid.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
        }
    }
}

async fn run(target: &str, community: &str, oid: &str, method: Method) -> Result<Vec<Sample>> {
    let address = socket_address(target)?;
    let base = parse_oid(oid)?;
    let mut session = AsyncSession::new_v2c(address, community.as_bytes(), 1)
        .await
        .map_err(transport)?;
    trace!("{method} {oid} on {address}");

    match method {
        Method::Get => {
            let pdu = session.get(&base).await.map_err(transport)?;
            Ok(pdu.varbinds.filter_map(to_sample).take(1).collect())
        }
        Method::GetNext => {
            let pdu = session.getnext(&base).await.map_err(transport)?;
            Ok(pdu.varbinds.filter_map(to_sample).take(1).collect())
        }
        Method::Walk => walk_bulk(&mut session, oid).await,
    }
}

async fn walk_bulk(session: &mut AsyncSession, top_oid: &str) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    let mut current = normalize_oid(top_oid).to_string();

    'walk: loop {
        let cursor = parse_oid(&current)?;
        let pdu = session
            .getbulk(&[&cursor], 0, MAX_REPEAT)
            .await
            .map_err(transport)?;

        let mut advanced = false;
        for (name, value) in pdu.varbinds {
            let name = name.to_string();
            if matches!(value, Value::EndOfMibView) || !in_subtree(&name, top_oid) {
                break 'walk;
            }
            if name == current {
                // Agent is not moving forward
                break 'walk;
            }
            advanced = true;
            current = name.clone();
            if let Some(value) = sample_value(&value) {
                samples.push(Sample { name, value });
            }
        }

        if !advanced {
            break;
        }
    }

    Ok(samples)
}

fn to_sample((name, value): (Oid<'_>, Value<'_>)) -> Option<Sample> {
    let value = sample_value(&value)?;
    Some(Sample {
        name: name.to_string(),
        value,
    })
}

fn sample_value(value: &Value<'_>) -> Option<SampleValue> {
    match value {
        Value::Integer(i) => Some(SampleValue::Integer(*i)),
        Value::Counter32(i) | Value::Unsigned32(i) | Value::Timeticks(i) => {
            Some(SampleValue::Integer(i64::from(*i)))
        }
        Value::Counter64(i) => i64::try_from(*i).ok().map(SampleValue::Integer),
        Value::OctetString(s) | Value::Opaque(s) => {
            Some(SampleValue::Text(String::from_utf8_lossy(s).into_owned()))
        }
        Value::Null | Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => None,
        other => Some(SampleValue::Text(format!("{other:?}"))),
    }
}

fn socket_address(target: &str) -> Result<SocketAddr> {
    if let Ok(address) = target.parse::<SocketAddr>() {
        return Ok(address);
    }
    let ip: IpAddr = target
        .trim()
        .parse()
        .map_err(|_| ProbeError::InvalidTarget(target.to_string()))?;
    Ok(SocketAddr::from((ip, SNMP_PORT)))
}

pub(crate) fn parse_oid(oid: &str) -> Result<Oid<'static>> {
    let arcs = normalize_oid(oid)
        .split('.')
        .map(str::parse::<u64>)
        .collect::<std::result::Result<Vec<u64>, _>>()
        .map_err(|_| ProbeError::InvalidOid(oid.to_string()))?;
    Oid::from(&arcs).map_err(|_| ProbeError::InvalidOid(oid.to_string()))
}

fn transport<E: fmt::Display>(err: E) -> ProbeError {
    ProbeError::Transport(err.to_string())
}
