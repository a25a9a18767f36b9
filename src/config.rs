//! donorsrv configuration
//!
//! Layered configuration: YAML file merged with `DONORSRV_`-prefixed
//! environment variables. Both feed URLs are configuration inputs; there are
//! no compiled-in endpoints.

use crate::error::{DonorSrvError, Result};
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/donorsrv.yaml";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Cadence of the periodic feed sync (default 5 minutes)
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default = "default_enable_api")]
    pub enable_api: bool,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

/// Feed endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// CSV export URL of the appointment feed
    #[serde(default)]
    pub appointments_url: String,
    /// CSV export URL of the inventory feed
    #[serde(default)]
    pub inventory_url: String,
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub feeds: FeedConfig,
}

fn default_service_name() -> String {
    "donorsrv".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_enable_api() -> bool {
    true
}

fn default_api_port() -> u16 {
    8090
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            poll_interval: default_poll_interval(),
            enable_api: default_enable_api(),
            api_port: default_api_port(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            appointments_url: String::new(),
            inventory_url: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path, merged with environment
    pub fn load_from(path: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("DONORSRV_").split("_"))
            .extract()
            .map_err(|e| DonorSrvError::config(format!("Failed to load configuration: {e}")))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.feeds.appointments_url.is_empty() {
            return Err(DonorSrvError::config("feeds.appointments_url must be set"));
        }
        if self.feeds.inventory_url.is_empty() {
            return Err(DonorSrvError::config("feeds.inventory_url must be set"));
        }
        for url in [&self.feeds.appointments_url, &self.feeds.inventory_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DonorSrvError::config(format!("invalid feed URL: {url}")));
            }
        }
        if self.service.poll_interval.is_zero() {
            return Err(DonorSrvError::config("service.poll_interval must be non-zero"));
        }
        Ok(())
    }
}
