// SPDX-License-Identifier: MIT

//! Configuration module for device access
//!
//! Loads and parses device definitions from environment variables and JSON.

use std::time::Duration;

use serde::Deserialize;


/// Default configuration values
pub mod defaults {
    pub const API_PORT: u16 = 8728;
    pub const API_TLS_PORT: u16 = 8729;
    pub const USERNAME: &str = "admin";
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const READ_TIMEOUT_SECS: u64 = 15;
}

/// Environment variable names used by the library
pub mod env_vars {
    pub const DEVICES_CONFIG: &str = "DEVICES_CONFIG";
    pub const DEVICE_HOST: &str = "DEVICE_HOST";
    pub const DEVICE_USERNAME: &str = "DEVICE_USERNAME";
    pub const DEVICE_PASSWORD: &str = "DEVICE_PASSWORD";
}

fn default_connect_timeout() -> u64 {
    defaults::CONNECT_TIMEOUT_SECS
}

fn default_read_timeout() -> u64 {
    defaults::READ_TIMEOUT_SECS
}

/// Configuration for a single managed device
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub host: String,
    /// API port; `None` selects 8728 (plain) or 8729 (TLS)
    #[serde(default)]
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl DeviceConfig {
    /// Creates a configuration with default port and timeouts.
    #[must_use]
    pub fn new(name: &str, host: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            port: None,
            username: username.to_string(),
            password: password.to_string(),
            use_tls: false,
            connect_timeout_secs: defaults::CONNECT_TIMEOUT_SECS,
            read_timeout_secs: defaults::READ_TIMEOUT_SECS,
        }
    }

    /// Effective API port for this device.
    #[must_use]
    pub fn api_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_tls {
            defaults::API_TLS_PORT
        } else {
            defaults::API_PORT
        })
    }

    /// `host:port` string for the API socket.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.api_port())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Validates device configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Device name cannot be empty".to_string());
        }

        if self.host.trim().is_empty() {
            return Err(format!("Host cannot be empty for device '{}'", self.name));
        }

        if self.username.trim().is_empty() {
            return Err(format!(
                "Username cannot be empty for device '{}'",
                self.name
            ));
        }

        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(format!(
                "Timeouts must be non-zero for device '{}'",
                self.name
            ));
        }

        Ok(())
    }
}

/// Device inventory loaded by the surrounding application
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub devices: Vec<DeviceConfig>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// `DEVICES_CONFIG` holds a JSON list of [`DeviceConfig`] entries; when
    /// absent, the single-device `DEVICE_HOST`/`DEVICE_USERNAME`/
    /// `DEVICE_PASSWORD` variables are used instead.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let devices = if let Ok(config_json) = std::env::var(env_vars::DEVICES_CONFIG) {
            serde_json::from_str(&config_json).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse DEVICES_CONFIG: {}. Using empty list.", e);
                vec![]
            })
        } else {
            let host = std::env::var(env_vars::DEVICE_HOST).ok();
            let username = std::env::var(env_vars::DEVICE_USERNAME)
                .unwrap_or_else(|_| defaults::USERNAME.to_string());
            let password = std::env::var(env_vars::DEVICE_PASSWORD).unwrap_or_default();

            if let Some(host) = host {
                vec![DeviceConfig::new("default", &host, &username, &password)]
            } else {
                tracing::warn!("No device configuration found.");
                vec![]
            }
        };

        for device in &devices {
            if let Err(e) = device.validate() {
                tracing::error!("Invalid device configuration: {}", e);
                tracing::warn!("Skipping invalid device: {}", device.name);
            }
        }

        Config { devices }
    }
}
