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

//! Typed decoding of inbound client control messages.
//!
//! Every message is an envelope `{"type": ..., "meta": ..., "data": ...}`. The `type`
//! field selects the body shape; a body that does not match its shape fails the whole
//! message, except for `register`, where each list entry is checked on its own.

use crate::provider::DataType;
use crate::registry::subscription_registry::SubscriptionEntry;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    meta: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(rename = "type")]
    type_code: String,
    moniker: String,
}

/// Body of a `setdata` message. The value is always written as a 64-bit float.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SetData {
    pub name: String,
    pub unit: String,
    pub value: f64,
}

/// Body of a `teleport` message.
///
/// A convenience compound command: it expands to a fixed set of position, attitude and
/// speed writes (see [`Teleport::writes`]) rather than being a generic write.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Teleport {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub airspeed: f64,
}

/// One fixed-unit Float64 write issued on behalf of a compound command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableWrite {
    pub name: &'static str,
    pub unit: &'static str,
    pub value: f64,
}

impl Teleport {
    /// The seven writes that place the aircraft. Bank and pitch are levelled to zero.
    pub fn writes(&self) -> [VariableWrite; 7] {
        let write = |name, unit, value| VariableWrite { name, unit, value };
        [
            write("PLANE LATITUDE", "degrees", self.latitude),
            write("PLANE LONGITUDE", "degrees", self.longitude),
            write("PLANE ALTITUDE", "feet", self.altitude),
            write("PLANE HEADING DEGREES TRUE", "degrees", self.heading),
            write("AIRSPEED TRUE", "knot", self.airspeed),
            write("PLANE BANK DEGREES", "degrees", 0.0),
            write("PLANE PITCH DEGREES", "degrees", 0.0),
        ]
    }
}

/// A `register` list entry that could not be used.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlMessage {
    Register {
        meta: String,
        entries: Vec<SubscriptionEntry>,
        rejected: Vec<RejectedEntry>,
    },
    Deregister,
    SetData(SetData),
    Teleport(Teleport),
    /// A `type` this server does not handle; ignored for forward compatibility.
    Unknown(String),
}

impl ControlMessage {
    pub fn kind(&self) -> &str {
        match self {
            ControlMessage::Register { .. } => "register",
            ControlMessage::Deregister => "deregister",
            ControlMessage::SetData(_) => "setdata",
            ControlMessage::Teleport(_) => "teleport",
            ControlMessage::Unknown(kind) => kind,
        }
    }
}

#[derive(Debug)]
pub enum ControlDecodeError {
    /// Not a JSON object with a string `type` field.
    InvalidEnvelope(serde_json::Error),
    /// The body does not match the shape its `type` requires.
    InvalidBody {
        kind: &'static str,
        source: serde_json::Error,
    },
    /// `register` data that is present but not a list.
    RegisterDataNotList,
}

impl Display for ControlDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ControlDecodeError::InvalidEnvelope(err) => {
                write!(f, "invalid control message envelope: {err}")
            }
            ControlDecodeError::InvalidBody { kind, source } => {
                write!(f, "invalid {kind} message body: {source}")
            }
            ControlDecodeError::RegisterDataNotList => {
                write!(f, "register data must be a list of entries")
            }
        }
    }
}

impl Error for ControlDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ControlDecodeError::InvalidEnvelope(err) => Some(err),
            ControlDecodeError::InvalidBody { source, .. } => Some(source),
            ControlDecodeError::RegisterDataNotList => None,
        }
    }
}

fn decode_body<T: for<'de> Deserialize<'de>>(
    kind: &'static str,
    data: Value,
) -> Result<T, ControlDecodeError> {
    serde_json::from_value(data).map_err(|source| ControlDecodeError::InvalidBody { kind, source })
}

fn decode_entry(index: usize, item: Value) -> Result<SubscriptionEntry, RejectedEntry> {
    let reject = |reason: String| RejectedEntry { index, reason };
    let raw: RawEntry = serde_json::from_value(item).map_err(|err| reject(err.to_string()))?;
    let data_type = raw
        .type_code
        .parse::<DataType>()
        .map_err(|err| reject(err.to_string()))?;
    Ok(SubscriptionEntry {
        name: raw.name,
        unit: raw.unit,
        data_type,
        alias: raw.moniker,
    })
}

fn decode_register(meta: String, data: Value) -> Result<ControlMessage, ControlDecodeError> {
    let items = match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        _ => return Err(ControlDecodeError::RegisterDataNotList),
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match decode_entry(index, item) {
            Ok(entry) => entries.push(entry),
            Err(rejection) => rejected.push(rejection),
        }
    }

    Ok(ControlMessage::Register {
        meta,
        entries,
        rejected,
    })
}

/// Decodes one raw client message.
pub fn decode(bytes: &[u8]) -> Result<ControlMessage, ControlDecodeError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(ControlDecodeError::InvalidEnvelope)?;
    let meta = envelope.meta.unwrap_or_default();

    match envelope.kind.as_str() {
        "register" => decode_register(meta, envelope.data),
        "deregister" => Ok(ControlMessage::Deregister),
        "setdata" => decode_body("setdata", envelope.data).map(ControlMessage::SetData),
        "teleport" => decode_body("teleport", envelope.data).map(ControlMessage::Teleport),
        _ => Ok(ControlMessage::Unknown(envelope.kind)),
    }
}
