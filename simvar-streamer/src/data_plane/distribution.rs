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

//! Fan-out of provider values to subscribed clients on every data-ready tick.

use crate::data_plane::payload::ServerMessage;
use crate::data_plane::value_codec::{self, SimValue};
use crate::observability::{events, fields};
use crate::registry::SharedRegistry;
use crate::transport::{ClientId, ClientTransport};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "distribution";

/// Counters for one tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickReport {
    pub payloads_sent: usize,
    pub values_read: usize,
    pub values_missing: usize,
}

pub struct DistributionPipeline {
    registry: Arc<SharedRegistry>,
    transport: Arc<dyn ClientTransport>,
}

impl DistributionPipeline {
    pub fn new(registry: Arc<SharedRegistry>, transport: Arc<dyn ClientTransport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Sends one `simvars` payload per live request, then broadcasts `status`.
    ///
    /// Payloads are assembled under the registry lock and sent after it is released.
    /// Values the provider does not have yet are omitted from that client's payload.
    pub async fn run_tick(&self, connected: bool) -> TickReport {
        let mut report = TickReport::default();
        let mut outbound: Vec<(ClientId, ServerMessage)> = Vec::new();

        {
            let state = self.registry.lock().await;
            let gateway = self.registry.gateway();
            state.subscriptions.for_each_request(|request| {
                let mut data: BTreeMap<String, SimValue> = BTreeMap::new();
                for (alias, subscription) in &request.subscriptions {
                    let Some(raw) = state.channels.value_of(subscription.handle, gateway) else {
                        report.values_missing += 1;
                        continue;
                    };
                    match value_codec::decode(&raw) {
                        Ok(value) => {
                            data.insert(alias.clone(), value);
                            report.values_read += 1;
                        }
                        Err(err) => {
                            warn!(
                                event = events::DISTRIBUTION_VALUE_DECODE_FAILED,
                                component = COMPONENT,
                                client_id = %request.client_id,
                                alias = %alias,
                                handle = subscription.handle.id(),
                                err = %err,
                                "omitting undecodable value"
                            );
                            report.values_missing += 1;
                        }
                    }
                }
                outbound.push((
                    request.client_id.clone(),
                    ServerMessage::Simvars {
                        meta: request.meta.clone(),
                        data,
                    },
                ));
            });
        }

        for (client_id, message) in outbound {
            match message.encode() {
                Ok(payload) => {
                    self.transport.send_to(&client_id, payload);
                    report.payloads_sent += 1;
                }
                Err(err) => warn!(
                    event = events::DISTRIBUTION_ENCODE_FAILED,
                    component = COMPONENT,
                    client_id = %client_id,
                    err = %err,
                    "unable to encode simvars payload"
                ),
            }
        }

        match ServerMessage::status(connected).encode() {
            Ok(payload) => self.transport.broadcast(payload),
            Err(err) => warn!(
                event = events::DISTRIBUTION_ENCODE_FAILED,
                component = COMPONENT,
                client_id = fields::NONE,
                err = %err,
                "unable to encode status payload"
            ),
        }

        debug!(
            event = events::DISTRIBUTION_TICK,
            component = COMPONENT,
            connected,
            payloads_sent = report.payloads_sent,
            values_read = report.values_read,
            values_missing = report.values_missing,
            "distribution tick complete"
        );
        report
    }
}
