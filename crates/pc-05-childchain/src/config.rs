//! Child chain configuration.
//!
//! Loaded from JSON (`ChainConfig::from_json`), then optionally overridden by
//! environment variables (`ChainConfig::apply_env_overrides`).

use std::env;

use serde::{Deserialize, Serialize};
use shared_types::{Address, ZERO_ADDRESS};

use crate::domain::ChainError;

/// Root configuration for a child chain operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Address of the deployed ownership predicate.
    #[serde(with = "address_hex")]
    pub ownership_predicate: Address,

    /// Address of the payment channel predicate, if deployed.
    #[serde(with = "optional_address_hex")]
    pub payment_channel_predicate: Option<Address>,

    /// First block number replayed by `Chain::sync_blocks`.
    pub sync_start_block: u64,

    /// Refetch attempts before a failing history check is treated as invalid.
    pub max_history_retries: u32,

    /// Root chain event polling.
    pub watcher: WatcherConfig,

    /// Logging.
    pub telemetry: TelemetryConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            ownership_predicate: ZERO_ADDRESS,
            payment_channel_predicate: None,
            sync_start_block: 3,
            max_history_retries: 2,
            watcher: WatcherConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl ChainConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ChainError> {
        serde_json::from_str(json).map_err(|e| ChainError::Config(e.to_string()))
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `PC_LOG_LEVEL`: Log level filter
    /// - `PC_JSON_LOGS`: `true` for JSON formatted logs
    /// - `PC_POLL_INTERVAL_MS`: Event watcher polling interval
    /// - `PC_CONFIRMATION`: Root chain confirmations before an event is applied
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("PC_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
        if let Ok(json) = env::var("PC_JSON_LOGS") {
            self.telemetry.json_logs = json.to_lowercase() == "true";
        }
        if let Some(interval) = env::var("PC_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.watcher.interval_ms = interval;
        }
        if let Some(confirmation) = env::var("PC_CONFIRMATION")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.watcher.confirmation = confirmation;
        }
        self
    }
}

/// Event watcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Root chain block to start from when nothing has been loaded yet.
    pub initial_block: u64,
    /// Polling interval in milliseconds.
    pub interval_ms: u64,
    /// Confirmations required before a log is delivered.
    pub confirmation: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            initial_block: 1,
            interval_ms: 1000,
            confirmation: 0,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,
    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

fn parse_address(value: &str) -> Result<Address, String> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let mut address = [0u8; 20];
    hex::decode_to_slice(digits, &mut address).map_err(|e| format!("invalid address {value}: {e}"))?;
    Ok(address)
}

mod address_hex {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use shared_types::{address_to_hex, Address};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&address_to_hex(address))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_address(&value).map_err(D::Error::custom)
    }
}

mod optional_address_hex {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use shared_types::{address_to_hex, Address};

    pub fn serialize<S: Serializer>(
        address: &Option<Address>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match address {
            Some(address) => serializer.serialize_some(&address_to_hex(address)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Address>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|value| super::parse_address(&value).map_err(D::Error::custom))
            .transpose()
    }
}
