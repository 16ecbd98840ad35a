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

//! Provider Gateway boundary.
//!
//! The simulation engine is reached only through [`ProviderGateway`]; everything the
//! engine pushes back (connection identity, data-ready ticks, quit notifications) arrives
//! through [`ProviderListener`].

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Opaque provider-assigned identifier of one variable registration.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariableHandle(u32);

impl VariableHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl Display for VariableHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared representation of a provider variable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataType {
    Int32,
    Int64,
    Float32,
    Float64,
    String8,
    String32,
    String64,
    String128,
    String256,
    String260,
    StringVariable,
}

impl DataType {
    /// Canonical lower-case type code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::String8 => "string8",
            DataType::String32 => "string32",
            DataType::String64 => "string64",
            DataType::String128 => "string128",
            DataType::String256 => "string256",
            DataType::String260 => "string260",
            DataType::StringVariable => "stringv",
        }
    }

    /// Byte width of the raw layout, `None` for variable-length strings.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Int32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::Float64 => Some(8),
            DataType::String8 => Some(8),
            DataType::String32 => Some(32),
            DataType::String64 => Some(64),
            DataType::String128 => Some(128),
            DataType::String256 => Some(256),
            DataType::String260 => Some(260),
            DataType::StringVariable => None,
        }
    }

    pub fn is_string(&self) -> bool {
        !matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
        )
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A type code that does not name any [`DataType`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownDataType(pub String);

impl Display for UnknownDataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown data type code: {:?}", self.0)
    }
}

impl Error for UnknownDataType {}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let data_type = match code.trim().to_ascii_lowercase().as_str() {
            "int32" => DataType::Int32,
            "int64" => DataType::Int64,
            "float32" => DataType::Float32,
            "float64" => DataType::Float64,
            "string8" => DataType::String8,
            "string32" => DataType::String32,
            "string64" => DataType::String64,
            "string128" => DataType::String128,
            "string256" => DataType::String256,
            "string260" => DataType::String260,
            "stringv" | "stringvariable" => DataType::StringVariable,
            _ => return Err(UnknownDataType(code.to_string())),
        };
        Ok(data_type)
    }
}

/// Current value of a registration as the provider stores it: little-endian scalars,
/// NUL-padded strings.
#[derive(Clone, Debug, PartialEq)]
pub struct RawValue {
    pub data_type: DataType,
    pub bytes: Vec<u8>,
}

impl RawValue {
    pub fn new(data_type: DataType, bytes: Vec<u8>) -> Self {
        Self { data_type, bytes }
    }

    pub fn int32(value: i32) -> Self {
        Self::new(DataType::Int32, value.to_le_bytes().to_vec())
    }

    pub fn int64(value: i64) -> Self {
        Self::new(DataType::Int64, value.to_le_bytes().to_vec())
    }

    pub fn float32(value: f32) -> Self {
        Self::new(DataType::Float32, value.to_le_bytes().to_vec())
    }

    pub fn float64(value: f64) -> Self {
        Self::new(DataType::Float64, value.to_le_bytes().to_vec())
    }

    /// Encodes `value` in the layout of a string `data_type`, truncating to fit fixed
    /// widths and always leaving a terminating NUL.
    pub fn string(data_type: DataType, value: &str) -> Self {
        let mut bytes: Vec<u8> = value.as_bytes().to_vec();
        match data_type.fixed_size() {
            Some(width) if data_type.is_string() => {
                bytes.truncate(width.saturating_sub(1));
                bytes.resize(width, 0);
            }
            _ => bytes.push(0),
        }
        Self::new(data_type, bytes)
    }

    /// Encodes a numeric value in the layout of `data_type`; string types get the
    /// decimal rendering.
    pub fn from_f64(data_type: DataType, value: f64) -> Self {
        match data_type {
            DataType::Int32 => Self::int32(value as i32),
            DataType::Int64 => Self::int64(value as i64),
            DataType::Float32 => Self::float32(value as f32),
            DataType::Float64 => Self::float64(value),
            string_type => Self::string(string_type, &value.to_string()),
        }
    }
}

/// Identity reported by the provider once a connection opens.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProviderInfo {
    pub app_name: String,
    pub app_version: String,
    pub app_build: String,
    pub api_version: String,
    pub api_build: String,
}

/// Provider Gateway failures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProviderError {
    ConnectFailed(String),
    NotConnected,
    RegistrationFailed { name: String, reason: String },
    WriteFailed { name: String, reason: String },
    DeregistrationFailed { handle: VariableHandle, reason: String },
    DisconnectFailed(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::ConnectFailed(reason) => {
                write!(f, "unable to connect to provider: {reason}")
            }
            ProviderError::NotConnected => write!(f, "provider is not connected"),
            ProviderError::RegistrationFailed { name, reason } => {
                write!(f, "unable to register variable {name:?}: {reason}")
            }
            ProviderError::WriteFailed { name, reason } => {
                write!(f, "unable to write variable {name:?}: {reason}")
            }
            ProviderError::DeregistrationFailed { handle, reason } => {
                write!(f, "unable to deregister handle {handle}: {reason}")
            }
            ProviderError::DisconnectFailed(reason) => {
                write!(f, "unable to disconnect from provider: {reason}")
            }
        }
    }
}

impl Error for ProviderError {}

/// Narrow interface to the external simulation engine.
///
/// Registration and writes are expected to return promptly. `read_variable` reads the
/// provider's cached value and must not block.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn connect(&self, name: &str) -> Result<(), ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    fn is_connected(&self) -> bool;

    async fn register_variable(
        &self,
        name: &str,
        unit: &str,
        data_type: DataType,
    ) -> Result<VariableHandle, ProviderError>;

    async fn unregister_variable(&self, handle: VariableHandle) -> Result<(), ProviderError>;

    async fn write_variable(
        &self,
        name: &str,
        unit: &str,
        value: f64,
        data_type: DataType,
    ) -> Result<(), ProviderError>;

    /// Returns `None` when the provider holds no value yet or the handle is stale.
    fn read_variable(&self, handle: VariableHandle) -> Option<RawValue>;

    /// Drives the provider's callback stream until `shutdown` is cancelled.
    ///
    /// Both intervals are owned by the gateway: `request_interval` paces data requests
    /// (and therefore data-ready ticks), `receive_interval` paces draining of the
    /// provider's inbound queue. No callback may be issued after this returns.
    async fn handle_events(
        &self,
        request_interval: Duration,
        receive_interval: Duration,
        listener: Arc<dyn ProviderListener>,
        shutdown: CancellationToken,
    );
}

/// Callback surface invoked from the provider's event loop.
#[async_trait]
pub trait ProviderListener: Send + Sync {
    async fn on_connected(&self, info: ProviderInfo);

    /// The provider quit. Treated as a shutdown trigger, never as a reconnect.
    async fn on_disconnected(&self);

    async fn on_data_ready(&self);

    async fn on_event(&self, event_id: u32);

    async fn on_exception(&self, code: u32);
}
