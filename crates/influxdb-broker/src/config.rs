// Copyright 2024-Present influxdb-broker contributors
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::errors::ConfigError;

/// Runtime configuration, sourced from `INFLUX_BROKER_*` environment
/// variables with working defaults for a local InfluxDB.
#[derive(Debug, Clone)]
pub struct Config {
    /// InfluxDB host name.
    pub host: String,
    /// InfluxDB HTTP API port.
    pub port: u16,
    /// Basic auth user for the HTTP API.
    pub user: String,
    /// Basic auth password for the HTTP API.
    pub password: String,
    /// Database the points are written into.
    pub database: String,
    /// Ship points over UDP instead of the HTTP API.
    pub use_udp: bool,
    /// InfluxDB UDP listener port, used when `use_udp` is set.
    pub udp_port: u16,
    /// Use https for the HTTP API.
    pub use_tls: bool,
    /// Consecutive failed flushes tolerated before the backlog is dropped.
    pub tick_limit: u32,
    /// Seconds between flush attempts.
    pub flush_interval_secs: u64,
    /// HTTP request timeout in seconds.
    pub flush_timeout_secs: u64,
    /// Bind address for the event intake listener.
    pub events_host: String,
    /// Bind port for the event intake listener.
    pub events_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
            user: "root".to_string(),
            password: "root".to_string(),
            database: "database".to_string(),
            use_udp: false,
            udp_port: 4444,
            use_tls: false,
            tick_limit: 300,
            flush_interval_secs: 1,
            flush_timeout_secs: 5,
            events_host: "0.0.0.0".to_string(),
            events_port: 9099,
        }
    }
}

impl Config {
    /// Create configuration from environment variables. Unset variables use
    /// the defaults; set but unparsable ones are logged and ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let config = Self {
            host: env::var("INFLUX_BROKER_HOST").unwrap_or(defaults.host),
            port: parse_env("INFLUX_BROKER_PORT").unwrap_or(defaults.port),
            user: env::var("INFLUX_BROKER_USER").unwrap_or(defaults.user),
            password: env::var("INFLUX_BROKER_PASSWORD").unwrap_or(defaults.password),
            database: env::var("INFLUX_BROKER_DATABASE").unwrap_or(defaults.database),
            use_udp: parse_bool_env("INFLUX_BROKER_USE_UDP").unwrap_or(defaults.use_udp),
            udp_port: parse_env("INFLUX_BROKER_UDP_PORT").unwrap_or(defaults.udp_port),
            use_tls: parse_bool_env("INFLUX_BROKER_USE_TLS").unwrap_or(defaults.use_tls),
            tick_limit: parse_env("INFLUX_BROKER_TICK_LIMIT").unwrap_or(defaults.tick_limit),
            flush_interval_secs: parse_env("INFLUX_BROKER_FLUSH_INTERVAL")
                .unwrap_or(defaults.flush_interval_secs),
            flush_timeout_secs: parse_env("INFLUX_BROKER_FLUSH_TIMEOUT")
                .unwrap_or(defaults.flush_timeout_secs),
            events_host: env::var("INFLUX_BROKER_EVENTS_HOST").unwrap_or(defaults.events_host),
            events_port: parse_env("INFLUX_BROKER_EVENTS_PORT").unwrap_or(defaults.events_port),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_BROKER_HOST cannot be empty".to_string(),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_BROKER_DATABASE cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_BROKER_PORT must be greater than 0".to_string(),
            ));
        }
        if self.tick_limit == 0 {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_BROKER_TICK_LIMIT must be at least 1".to_string(),
            ));
        }
        if self.flush_interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_BROKER_FLUSH_INTERVAL must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparsable {name}={raw:?}");
            None
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("ignoring unparsable {name}={raw:?}");
            None
        }
    }
}
