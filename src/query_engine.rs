use crate::config::CONFIG;
use crate::device::Connection;
use crate::error::Result;
use crate::snmp::{Exchange, Method, Sample};
use std::time::Duration;
use tracing::{debug, trace};

const TIMEOUT: Duration = Duration::from_secs(5);
const RETRY: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// How hard to try each SNMP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per exchange. Zero still sends one request.
    pub retry: usize,
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry: RETRY,
            timeout: TIMEOUT,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(retry: usize, timeout: Duration) -> Self {
        Self {
            retry,
            timeout,
            ..Self::default()
        }
    }

    /// Policy built from the global configuration file.
    pub fn from_config() -> Self {
        Self {
            retry: CONFIG.retry,
            timeout: Duration::from_secs(CONFIG.timeout_secs),
            delay: Duration::from_millis(CONFIG.retry_delay_ms),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Issues exchanges against one device, retrying until samples come back.
pub struct QueryEngine<'a, E> {
    exchange: &'a E,
    connection: &'a Connection,
    policy: &'a RetryPolicy,
}

impl<'a, E: Exchange> QueryEngine<'a, E> {
    pub fn new(exchange: &'a E, connection: &'a Connection, policy: &'a RetryPolicy) -> Self {
        Self {
            exchange,
            connection,
            policy,
        }
    }

    pub fn target(&self) -> &str {
        &self.connection.snmp_address
    }

    /// Runs one exchange with the retry budget.
    ///
    /// Stops at the first attempt that yields any sample. When every attempt
    /// comes back empty, the last attempt's error is returned if it failed,
    /// otherwise an empty sample set.
    pub async fn query(&self, oid: &str, method: Method) -> Result<Vec<Sample>> {
        let attempts = self.policy.retry.max(1);
        let mut last = Ok(Vec::new());

        for attempt in 1..=attempts {
            trace!(
                "{} {method} {oid} attempt {attempt}/{attempts}",
                self.connection.snmp_address
            );
            last = self
                .exchange
                .exchange(
                    &self.connection.snmp_address,
                    &self.connection.snmp_community,
                    oid,
                    method,
                    self.policy.timeout,
                )
                .await;

            match &last {
                Ok(samples) if !samples.is_empty() => break,
                Ok(_) => debug!("{} {method} {oid}: no samples", self.connection.snmp_address),
                Err(e) => debug!("{} {method} {oid}: {e}", self.connection.snmp_address),
            }

            if attempt < attempts && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        last
    }
}
