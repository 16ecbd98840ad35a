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

//! Data-plane layer.
//!
//! Turns provider data-ready ticks into per-client `simvars` payloads and the shared
//! `status` broadcast. Raw provider bytes are decoded here and nowhere else.
//!
//! ```
//! use simvar_streamer::data_plane::payload::ServerMessage;
//! use simvar_streamer::data_plane::value_codec::{decode, SimValue};
//! use simvar_streamer::RawValue;
//! use std::collections::BTreeMap;
//!
//! let value = decode(&RawValue::float64(123.4)).unwrap();
//! let message = ServerMessage::Simvars {
//!     meta: "panel1".to_string(),
//!     data: BTreeMap::from([("spd".to_string(), value)]),
//! };
//! assert_eq!(
//!     &*message.encode().unwrap(),
//!     r#"{"type":"simvars","meta":"panel1","data":{"spd":123.4}}"#
//! );
//! # let _ = SimValue::Int32(0);
//! ```

pub mod distribution;
pub mod payload;
pub mod value_codec;
