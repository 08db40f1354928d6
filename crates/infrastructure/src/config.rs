use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::positions::FALLBACK_ENDPOINT;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
        }
    }
}

/// Timings of the simulated transport.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationSettings {
    /// Period of the autonomous tag mutation process
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Period of the data-changed notifier while connected
    #[serde(default = "default_data_interval_secs")]
    pub data_interval_secs: u64,
    /// Simulated connection handshake delay
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,
    /// Changeover settling delay between "Configured" and "Running"
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_tick_interval_secs() -> u64 {
    2
}
fn default_data_interval_secs() -> u64 {
    3
}
fn default_connect_delay_ms() -> u64 {
    1500
}
fn default_settle_delay_ms() -> u64 {
    500
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn data_interval(&self) -> Duration {
        Duration::from_secs(self.data_interval_secs)
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            data_interval_secs: default_data_interval_secs(),
            connect_delay_ms: default_connect_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Timings of the health monitoring loop.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorSettings {
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Sleep after a failed monitoring cycle
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Wait between disconnecting and reconnecting an errored session
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

fn default_scan_interval_secs() -> u64 {
    5
}
fn default_backoff_secs() -> u64 {
    10
}
fn default_reconnect_delay_secs() -> u64 {
    2
}

impl MonitorSettings {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            backoff_secs: default_backoff_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LineSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    /// Line topology override; defaults to the built-in four-machine line
    #[serde(default)]
    pub positions: Option<HashMap<String, String>>,
    #[serde(default = "default_fallback_endpoint")]
    pub fallback_endpoint: String,
}

fn default_fallback_endpoint() -> String {
    FALLBACK_ENDPOINT.to_string()
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            simulation: SimulationSettings::default(),
            monitor: MonitorSettings::default(),
            positions: None,
            fallback_endpoint: default_fallback_endpoint(),
        }
    }
}

impl LineSettings {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Base config file - e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. LINECTL__SERVER__API_PORT=8080)
            .add_source(Environment::with_prefix("LINECTL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
