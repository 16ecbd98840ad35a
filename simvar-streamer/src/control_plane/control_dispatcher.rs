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

//! Applies transport events and decoded control messages to the registries and the
//! provider.

use crate::control_plane::control_message::{self, ControlMessage, VariableWrite};
use crate::observability::{events, fields};
use crate::provider::{DataType, ProviderGateway};
use crate::registry::subscription_registry::UpsertOutcome;
use crate::registry::SharedRegistry;
use crate::transport::{ClientId, TransportEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "control_dispatcher";

/// What the dispatcher did with one transport event.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    ClientConnected,
    ClientDisconnected { released: bool },
    Registered(UpsertOutcome),
    Deregistered { released: bool },
    Written { succeeded: usize, failed: usize },
    Ignored,
    Malformed,
}

pub struct ControlDispatcher {
    registry: Arc<SharedRegistry>,
    gateway: Arc<dyn ProviderGateway>,
}

impl ControlDispatcher {
    pub fn new(registry: Arc<SharedRegistry>, gateway: Arc<dyn ProviderGateway>) -> Self {
        Self { registry, gateway }
    }

    pub async fn handle_event(&self, event: TransportEvent) -> DispatchOutcome {
        match event {
            TransportEvent::ClientConnected(client_id) => {
                info!(
                    event = events::CONTROL_CLIENT_CONNECTED,
                    component = COMPONENT,
                    client_id = %client_id,
                    "client connected"
                );
                DispatchOutcome::ClientConnected
            }
            TransportEvent::ClientDisconnected(client_id) => {
                let released = self.registry.remove_request(&client_id).await;
                info!(
                    event = events::CONTROL_CLIENT_DISCONNECTED,
                    component = COMPONENT,
                    client_id = %client_id,
                    released,
                    "client disconnected"
                );
                DispatchOutcome::ClientDisconnected { released }
            }
            TransportEvent::ClientMessage(client_id, bytes) => {
                self.handle_message(&client_id, &bytes).await
            }
        }
    }

    async fn handle_message(&self, client_id: &ClientId, bytes: &[u8]) -> DispatchOutcome {
        let message = match control_message::decode(bytes) {
            Ok(message) => message,
            Err(err) => {
                warn!(
                    event = events::CONTROL_MESSAGE_MALFORMED,
                    component = COMPONENT,
                    client_id = %client_id,
                    err = %err,
                    "dropping malformed control message"
                );
                return DispatchOutcome::Malformed;
            }
        };
        debug!(
            event = events::CONTROL_MESSAGE_DECODED,
            component = COMPONENT,
            client_id = %client_id,
            kind = message.kind(),
            "decoded control message"
        );

        match message {
            ControlMessage::Register {
                meta,
                entries,
                rejected,
            } => {
                for rejection in &rejected {
                    warn!(
                        event = events::REQUEST_ENTRY_DROPPED,
                        component = COMPONENT,
                        client_id = %client_id,
                        index = rejection.index,
                        reason = fields::REASON_INVALID_ENTRY,
                        err = %rejection.reason,
                        "dropping malformed register entry"
                    );
                }
                let mut outcome = self.registry.upsert_request(client_id, &meta, entries).await;
                outcome.dropped += rejected.len();
                DispatchOutcome::Registered(outcome)
            }
            ControlMessage::Deregister => {
                let released = self.registry.remove_request(client_id).await;
                DispatchOutcome::Deregistered { released }
            }
            ControlMessage::SetData(set_data) => {
                let ok = self
                    .write(
                        client_id,
                        &set_data.name,
                        &set_data.unit,
                        set_data.value,
                    )
                    .await;
                DispatchOutcome::Written {
                    succeeded: usize::from(ok),
                    failed: usize::from(!ok),
                }
            }
            ControlMessage::Teleport(teleport) => {
                info!(
                    event = events::CONTROL_TELEPORT,
                    component = COMPONENT,
                    client_id = %client_id,
                    latitude = teleport.latitude,
                    longitude = teleport.longitude,
                    altitude = teleport.altitude,
                    heading = teleport.heading,
                    airspeed = teleport.airspeed,
                    "teleporting aircraft"
                );
                let mut succeeded = 0;
                let mut failed = 0;
                for VariableWrite { name, unit, value } in teleport.writes() {
                    if self.write(client_id, name, unit, value).await {
                        succeeded += 1;
                    } else {
                        failed += 1;
                    }
                }
                DispatchOutcome::Written { succeeded, failed }
            }
            ControlMessage::Unknown(kind) => {
                info!(
                    event = events::CONTROL_MESSAGE_UNKNOWN,
                    component = COMPONENT,
                    client_id = %client_id,
                    kind = %kind,
                    "ignoring unhandled control message"
                );
                DispatchOutcome::Ignored
            }
        }
    }

    async fn write(&self, client_id: &ClientId, name: &str, unit: &str, value: f64) -> bool {
        match self
            .gateway
            .write_variable(name, unit, value, DataType::Float64)
            .await
        {
            Ok(()) => {
                debug!(
                    event = events::CONTROL_WRITE_OK,
                    component = COMPONENT,
                    client_id = %client_id,
                    variable = name,
                    value,
                    "wrote provider variable"
                );
                true
            }
            Err(err) => {
                warn!(
                    event = events::CONTROL_WRITE_FAILED,
                    component = COMPONENT,
                    client_id = %client_id,
                    variable = name,
                    err = %err,
                    "provider write failed"
                );
                false
            }
        }
    }
}
