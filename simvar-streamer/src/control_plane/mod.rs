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

//! Control-plane layer.
//!
//! Decodes client control messages into a tagged [`ControlMessage`] at the boundary and
//! applies them: subscription changes go to the registry, one-shot writes go straight to
//! the provider. Malformed input is logged and dropped; nothing here fails the caller.
//!
//! ```
//! use simvar_streamer::control_plane::control_message::{decode, ControlMessage};
//!
//! let message = decode(br#"{"type":"teleport","data":{"latitude":47.0,"longitude":8.0,"altitude":1200,"heading":90,"airspeed":120}}"#).unwrap();
//! let ControlMessage::Teleport(teleport) = message else { unreachable!() };
//! assert_eq!(teleport.writes().len(), 7);
//! ```
//!
//! [`ControlMessage`]: control_message::ControlMessage

pub mod control_dispatcher;
pub mod control_message;
