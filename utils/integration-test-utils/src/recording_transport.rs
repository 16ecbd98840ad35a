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

use serde_json::Value;
use simvar_streamer::{ClientId, ClientTransport};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Transport double that keeps every payload it is asked to deliver.
#[derive(Default)]
pub struct RecordingTransport {
    clients: Mutex<BTreeSet<ClientId>>,
    sent: Mutex<BTreeMap<ClientId, Vec<Arc<str>>>>,
    broadcasts: Mutex<Vec<Arc<str>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connect(&self, client_id: &ClientId) {
        self.clients.lock().unwrap().insert(client_id.clone());
    }

    pub fn disconnect(&self, client_id: &ClientId) {
        self.clients.lock().unwrap().remove(client_id);
    }

    pub fn sent_to(&self, client_id: &ClientId) -> Vec<Arc<str>> {
        self.sent
            .lock()
            .unwrap()
            .get(client_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Last payload sent to `client_id`, parsed as JSON.
    pub fn last_json_for(&self, client_id: &ClientId) -> Option<Value> {
        self.sent_to(client_id)
            .last()
            .and_then(|payload| serde_json::from_str(payload).ok())
    }

    pub fn broadcasts(&self) -> Vec<Arc<str>> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn last_broadcast_json(&self) -> Option<Value> {
        self.broadcasts()
            .last()
            .and_then(|payload| serde_json::from_str(payload).ok())
    }
}

impl ClientTransport for RecordingTransport {
    fn send_to(&self, client_id: &ClientId, payload: Arc<str>) {
        self.sent
            .lock()
            .unwrap()
            .entry(client_id.clone())
            .or_default()
            .push(payload);
    }

    fn broadcast(&self, payload: Arc<str>) {
        self.broadcasts.lock().unwrap().push(payload);
    }

    fn connected_clients(&self) -> Vec<ClientId> {
        self.clients.lock().unwrap().iter().cloned().collect()
    }
}
