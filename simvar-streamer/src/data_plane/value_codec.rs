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

//! Conversion of raw provider values into native scalars.

use crate::provider::{DataType, RawValue};
use serde::Serialize;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A decoded variable value as it appears in outbound payloads.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
}

/// Raw bytes too short for the declared type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValueDecodeError {
    pub data_type: DataType,
    pub expected: usize,
    pub actual: usize,
}

impl Display for ValueDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} value needs {} bytes, provider returned {}",
            self.data_type, self.expected, self.actual
        )
    }
}

impl Error for ValueDecodeError {}

fn take<const N: usize>(raw: &RawValue) -> Result<[u8; N], ValueDecodeError> {
    raw.bytes
        .get(..N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(ValueDecodeError {
            data_type: raw.data_type,
            expected: N,
            actual: raw.bytes.len(),
        })
}

/// Decodes `raw` according to its declared type. Strings end at the first NUL (or the
/// end of the buffer) and invalid UTF-8 is replaced.
pub fn decode(raw: &RawValue) -> Result<SimValue, ValueDecodeError> {
    let value = match raw.data_type {
        DataType::Int32 => SimValue::Int32(i32::from_le_bytes(take::<4>(raw)?)),
        DataType::Int64 => SimValue::Int64(i64::from_le_bytes(take::<8>(raw)?)),
        DataType::Float32 => SimValue::Float32(f32::from_le_bytes(take::<4>(raw)?)),
        DataType::Float64 => SimValue::Float64(f64::from_le_bytes(take::<8>(raw)?)),
        _ => {
            let end = raw
                .bytes
                .iter()
                .position(|byte| *byte == 0)
                .unwrap_or(raw.bytes.len());
            SimValue::String(String::from_utf8_lossy(&raw.bytes[..end]).into_owned())
        }
    };
    Ok(value)
}
