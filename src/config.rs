use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;
use tracing::error;

const CONFIG_FILE: &str = "cpu_probe.toml";
pub const DEFAULT_MAX_CHAIN_STEPS: usize = 256;

/// Global configuration
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Per-attempt SNMP timeout, in seconds.
    pub timeout_secs: u64,
    /// Attempts per SNMP exchange.
    pub retry: usize,
    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Upper bound on GETNEXT steps in a chained walk.
    pub max_chain_steps: usize,
    /// CSV file listing the devices to poll.
    pub target_list: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            retry: 3,
            retry_delay_ms: 100,
            max_chain_steps: DEFAULT_MAX_CHAIN_STEPS,
            target_list: "cpu_targets.csv".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|e| {
                error!("Unable to parse {CONFIG_FILE}, using defaults: {e}");
                Self::default()
            }),
            Err(e) => {
                error!("Unable to read {CONFIG_FILE}, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
