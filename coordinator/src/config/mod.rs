pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::constants::{prometheus, solarwinds, vcenter};

pub use manager::ConfigManager;
pub use secrets::Secrets;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub vcenter: Option<VcenterConfig>,
    pub prometheus: Option<PrometheusConfig>,
    pub solarwinds: Option<SolarwindsConfig>,
    // Populated from the target group files next to main.toml
    #[serde(skip)]
    pub groups: HashMap<String, TargetGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcenterConfig {
    /// Base URL or bare hostname of the control plane
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    pub datacenter: String,
    #[serde(default = "default_true")]
    pub insecure: bool,
    pub ca_file: Option<String>,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_millis: u64,
}

impl VcenterConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    pub server: String,
    #[serde(default = "default_prometheus_port")]
    pub port: u16,
    #[serde(default = "default_silence_duration")]
    pub silence_duration: u64,
    #[serde(default = "default_silence_units")]
    pub silence_units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarwindsConfig {
    pub host: String,
    #[serde(default = "default_solarwinds_port")]
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    #[serde(default = "default_name_property")]
    pub name_property: String,
    #[serde(default = "default_true")]
    pub ssl: bool,
    #[serde(default = "default_true")]
    pub insecure: bool,
}

/// Named list of targets, one file per group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetGroup {
    pub targets: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_wait_timeout() -> u64 {
    vcenter::WAIT_TIMEOUT_SECONDS
}

fn default_poll_interval() -> u64 {
    vcenter::POLL_INTERVAL_MILLIS
}

fn default_prometheus_port() -> u16 {
    prometheus::DEFAULT_PORT
}

fn default_silence_duration() -> u64 {
    prometheus::DEFAULT_SILENCE_DURATION
}

fn default_silence_units() -> String {
    prometheus::DEFAULT_SILENCE_UNITS.to_string()
}

fn default_solarwinds_port() -> u16 {
    solarwinds::DEFAULT_PORT
}

fn default_name_property() -> String {
    solarwinds::DEFAULT_NAME_PROPERTY.to_string()
}
