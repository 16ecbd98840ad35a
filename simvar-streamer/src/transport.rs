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

//! Client transport boundary.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Opaque transport-assigned identity of one connected client.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inbound events produced by the transport, consumed by one sequential loop.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    ClientConnected(ClientId),
    ClientDisconnected(ClientId),
    ClientMessage(ClientId, Vec<u8>),
}

/// Outbound half of the client transport.
///
/// Both operations are best-effort and must never block the caller: a payload for a slow
/// or vanished client may be dropped silently.
pub trait ClientTransport: Send + Sync {
    fn send_to(&self, client_id: &ClientId, payload: Arc<str>);

    fn broadcast(&self, payload: Arc<str>);

    /// Identities of currently connected clients, for diagnostics.
    fn connected_clients(&self) -> Vec<ClientId>;
}
