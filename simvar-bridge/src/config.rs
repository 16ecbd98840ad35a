/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use clap::Parser;
use serde::{Deserialize, Serialize};
use simvar_streamer::LifecycleConfig;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Streams simulator variables to WebSocket clients")]
pub(crate) struct BridgeArgs {
    /// Name announced to the simulator.
    #[arg(short, long)]
    pub(crate) name: Option<String>,
    /// Address the HTTP/WebSocket server binds to.
    #[arg(short, long)]
    pub(crate) address: Option<String>,
    /// Seconds to keep retrying the simulator connection.
    #[arg(short, long, value_name = "SECONDS")]
    pub(crate) timeout: Option<u64>,
    #[arg(short, long, value_name = "FILE")]
    pub(crate) config: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) streamer_config: StreamerConfig,
    #[serde(default)]
    pub(crate) server_config: ServerConfig,
    #[serde(default)]
    pub(crate) simulator_config: SimulatorConfig,
    #[serde(default = "default_log_level")]
    pub(crate) log_level: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StreamerConfig {
    pub(crate) connection_name: String,
    pub(crate) connect_retry_ms: u64,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) request_interval_ms: u64,
    pub(crate) receive_interval_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub(crate) address: String,
    pub(crate) client_queue_size: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    pub(crate) connect_delay_ms: u64,
    pub(crate) start_latitude: f64,
    pub(crate) start_longitude: f64,
    pub(crate) start_altitude_ft: f64,
    pub(crate) start_heading_deg: f64,
    pub(crate) start_airspeed_kt: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            streamer_config: StreamerConfig::default(),
            server_config: ServerConfig::default(),
            simulator_config: SimulatorConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            connection_name: "SimVarBridge".to_string(),
            connect_retry_ms: 1000,
            connect_timeout_secs: 600,
            request_interval_ms: 250,
            receive_interval_ms: 1,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8888".to_string(),
            client_queue_size: 64,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: 0,
            start_latitude: 47.4582,
            start_longitude: 8.5555,
            start_altitude_ft: 1416.0,
            start_heading_deg: 140.0,
            start_airspeed_kt: 0.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: String,
        source: std::io::Error,
    },
    Parse {
        path: String,
        source: json5::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Unable to read config file {path}: {source}")
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Unable to parse config file {path}: {source}")
            }
            ConfigError::Invalid(reason) => write!(f, "Invalid configuration: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl Config {
    pub fn from_json5(path: &str, contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Loads the file named by `--config` (defaults when absent) and applies the other
    /// flags on top.
    pub(crate) fn load(args: &BridgeArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Self::from_json5(path, &contents)?
            }
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn apply_args(&mut self, args: &BridgeArgs) {
        if let Some(name) = &args.name {
            self.streamer_config.connection_name = name.clone();
        }
        if let Some(address) = &args.address {
            self.server_config.address = address.clone();
        }
        if let Some(timeout) = args.timeout {
            self.streamer_config.connect_timeout_secs = timeout;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server_config.client_queue_size == 0 {
            return Err(ConfigError::Invalid(
                "server_config.client_queue_size must be at least 1".to_string(),
            ));
        }
        if self.streamer_config.connect_retry_ms == 0 || self.streamer_config.request_interval_ms == 0
        {
            return Err(ConfigError::Invalid(
                "retry and request intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let streamer = &self.streamer_config;
        LifecycleConfig {
            connection_name: streamer.connection_name.clone(),
            retry_interval: Duration::from_millis(streamer.connect_retry_ms),
            connect_timeout: Duration::from_secs(streamer.connect_timeout_secs),
            request_interval: Duration::from_millis(streamer.request_interval_ms),
            receive_interval: Duration::from_millis(streamer.receive_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BridgeArgs, Config, ConfigError};
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_json5("inline", "{}").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.server_config.address, "0.0.0.0:8888");
        let lifecycle = config.lifecycle_config();
        assert_eq!(lifecycle.retry_interval, Duration::from_secs(1));
        assert_eq!(lifecycle.connect_timeout, Duration::from_secs(600));
        assert_eq!(lifecycle.request_interval, Duration::from_millis(250));
        assert_eq!(lifecycle.receive_interval, Duration::from_millis(1));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_json5(
            "inline",
            r#"{
                // comments and trailing commas are fine
                streamer_config: { connect_timeout_secs: 30, },
                log_level: "debug",
            }"#,
        )
        .unwrap();

        assert_eq!(config.streamer_config.connect_timeout_secs, 30);
        assert_eq!(config.streamer_config.connection_name, "SimVarBridge");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_json5("inline", "{ server_config: { port: 80 } }").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::default();
        config.apply_args(&BridgeArgs {
            name: Some("Cockpit".to_string()),
            address: Some("127.0.0.1:9000".to_string()),
            timeout: Some(5),
            config: None,
        });

        assert_eq!(config.streamer_config.connection_name, "Cockpit");
        assert_eq!(config.server_config.address, "127.0.0.1:9000");
        assert_eq!(
            config.lifecycle_config().connect_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load(&BridgeArgs {
            config: Some("/nonexistent/simvar-bridge.json5".to_string()),
            ..BridgeArgs::default()
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn shipped_config_parses() {
        let config = Config::from_json5(
            "config/simvar-bridge.json5",
            include_str!("../config/simvar-bridge.json5"),
        )
        .unwrap();

        assert_eq!(config.simulator_config.connect_delay_ms, 2000);
    }
}
