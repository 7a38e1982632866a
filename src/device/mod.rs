use crate::config::{CONFIG, DEFAULT_MAX_CHAIN_STEPS};
use crate::error::Result;
use crate::query_engine::{QueryEngine, RetryPolicy};
use crate::snmp::{Exchange, SnmpSession};
use std::time::Duration;
use tracing::{debug, info, warn};

mod connection;
pub use connection::Connection;
pub mod dispatch;
pub mod strategy;
mod system_info;
pub use system_info::SYS_DESCR;
pub mod vendor;
pub use vendor::VendorTag;

/// CPU prober for devices reachable through one [`Exchange`].
///
/// Every call is independent: nothing learned about a device is kept.
pub struct Probe<E> {
    exchange: E,
    policy: RetryPolicy,
    max_chain_steps: usize,
}

impl Probe<SnmpSession> {
    /// SNMP v2c prober using settings from the configuration file.
    pub fn from_config() -> Self {
        Self::new(SnmpSession, RetryPolicy::from_config())
            .with_max_chain_steps(CONFIG.max_chain_steps)
    }
}

impl<E: Exchange> Probe<E> {
    pub fn new(exchange: E, policy: RetryPolicy) -> Self {
        Self {
            exchange,
            policy,
            max_chain_steps: DEFAULT_MAX_CHAIN_STEPS,
        }
    }

    pub fn with_max_chain_steps(mut self, steps: usize) -> Self {
        self.max_chain_steps = steps;
        self
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    fn engine<'a>(&'a self, connection: &'a Connection) -> QueryEngine<'a, E> {
        QueryEngine::new(&self.exchange, connection, &self.policy)
    }

    /// Reads the device's sysDescr string.
    pub async fn system_description(&self, connection: &Connection) -> Result<String> {
        let result = system_info::system_description(&self.engine(connection)).await;
        contain(connection, "system_description", result)
    }

    /// Works out which vendor the device belongs to.
    ///
    /// Only transport failures are errors. A description that matches no
    /// rule yields [`VendorTag::Unrecognized`].
    pub async fn classify_vendor(&self, connection: &Connection) -> Result<VendorTag> {
        let descr = self.system_description(connection).await?;
        let tag = vendor::classify(&descr);
        debug!("{}: sysDescr {descr:?} -> {tag:?}", connection.snmp_address);
        Ok(tag)
    }

    /// Classifies the device, then reads its CPU utilization percentage.
    pub async fn cpu_utilization(&self, connection: &Connection) -> Result<i64> {
        let (_, cpu) = self.poll(connection).await?;
        Ok(cpu)
    }

    /// Like [`Probe::cpu_utilization`], also handing back the vendor tag.
    pub async fn poll(&self, connection: &Connection) -> Result<(VendorTag, i64)> {
        let tag = self.classify_vendor(connection).await?;
        let spec = dispatch::collection_spec(tag, &connection.snmp_address)?;
        let result = strategy::collect(&self.engine(connection), &spec, self.max_chain_steps).await;
        let cpu = contain(connection, "cpu_utilization", result)?;
        info!("{}: {tag} cpu {cpu}%", connection.snmp_address);
        Ok((tag, cpu))
    }
}

/// Turns data faults into a zero reading plus a warning. Everything else is
/// handed back to the caller untouched.
fn contain<T: Default>(connection: &Connection, operation: &str, result: Result<T>) -> Result<T> {
    match result {
        Err(e) if e.is_contained() => {
            warn!(
                "{} recovered in {operation}: {e}",
                connection.snmp_address
            );
            Ok(T::default())
        }
        other => other,
    }
}

/// Vendor tag for `target` over SNMP v2c, as its symbolic name.
///
/// An unmatched description gives an empty string, not an error.
pub async fn classify_vendor(
    target: &str,
    community: &str,
    retry: usize,
    timeout: Duration,
) -> Result<String> {
    let probe = Probe::new(SnmpSession, RetryPolicy::new(retry, timeout));
    let tag = probe
        .classify_vendor(&Connection::new(target, community))
        .await?;
    Ok(tag.to_string())
}

/// CPU utilization of `target` over SNMP v2c.
pub async fn cpu_utilization(
    target: &str,
    community: &str,
    timeout: Duration,
    retry: usize,
) -> Result<i64> {
    let probe = Probe::new(SnmpSession, RetryPolicy::new(retry, timeout));
    probe.cpu_utilization(&Connection::new(target, community)).await
}
