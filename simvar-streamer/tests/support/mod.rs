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

use integration_test_utils::{RecordingGateway, RecordingTransport};
use serde_json::{json, Value};
use simvar_streamer::{ClientId, DispatchOutcome, LifecycleConfig, SimVarStreamer, TransportEvent};
use std::sync::Arc;

pub(crate) struct Harness {
    pub gateway: Arc<RecordingGateway>,
    pub transport: Arc<RecordingTransport>,
    pub streamer: Arc<SimVarStreamer>,
}

pub(crate) fn make_harness(config: LifecycleConfig) -> Harness {
    integration_test_utils::init_logging();
    let gateway = RecordingGateway::new();
    let transport = RecordingTransport::new();
    let streamer = SimVarStreamer::new(gateway.clone(), transport.clone(), config);
    Harness {
        gateway,
        transport,
        streamer,
    }
}

pub(crate) fn entry(name: &str, unit: &str, type_code: &str, moniker: &str) -> Value {
    json!({"name": name, "unit": unit, "type": type_code, "moniker": moniker})
}

impl Harness {
    pub(crate) async fn send(&self, client: &ClientId, message: Value) -> DispatchOutcome {
        self.streamer
            .handle_transport_event(TransportEvent::ClientMessage(
                client.clone(),
                message.to_string().into_bytes(),
            ))
            .await
    }

    pub(crate) async fn register(
        &self,
        client: &ClientId,
        meta: &str,
        entries: Vec<Value>,
    ) -> DispatchOutcome {
        self.send(
            client,
            json!({"type": "register", "meta": meta, "data": entries}),
        )
        .await
    }

    pub(crate) async fn connect(&self, client: &ClientId) {
        self.transport.connect(client);
        self.streamer
            .handle_transport_event(TransportEvent::ClientConnected(client.clone()))
            .await;
    }

    #[allow(dead_code)]
    pub(crate) async fn disconnect(&self, client: &ClientId) -> DispatchOutcome {
        self.transport.disconnect(client);
        self.streamer
            .handle_transport_event(TransportEvent::ClientDisconnected(client.clone()))
            .await
    }
}
