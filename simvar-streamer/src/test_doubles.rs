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

//! In-crate doubles for unit tests.

use crate::provider::{
    DataType, ProviderError, ProviderGateway, ProviderListener, RawValue, VariableHandle,
};
use crate::transport::{ClientId, ClientTransport};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct WriteCall {
    pub name: String,
    pub unit: String,
    pub value: f64,
    pub data_type: DataType,
}

#[derive(Default)]
pub(crate) struct CountingGateway {
    next_handle: AtomicU32,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    connected: AtomicBool,
    rejected: HashSet<String>,
    values: Mutex<HashMap<VariableHandle, RawValue>>,
    writes: Mutex<Vec<WriteCall>>,
}

impl CountingGateway {
    pub(crate) fn rejecting(name: &str) -> Self {
        Self {
            rejected: HashSet::from([name.to_string()]),
            ..Self::default()
        }
    }

    pub(crate) fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_value(&self, handle: VariableHandle, value: RawValue) {
        self.values.lock().unwrap().insert(handle, value);
    }

    pub(crate) fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderGateway for CountingGateway {
    async fn connect(&self, _name: &str) -> Result<(), ProviderError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn register_variable(
        &self,
        name: &str,
        _unit: &str,
        _data_type: DataType,
    ) -> Result<VariableHandle, ProviderError> {
        if self.rejected.contains(name) {
            return Err(ProviderError::RegistrationFailed {
                name: name.to_string(),
                reason: "rejected by test gateway".to_string(),
            });
        }
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VariableHandle::new(
            self.next_handle.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }

    async fn unregister_variable(&self, handle: VariableHandle) -> Result<(), ProviderError> {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.values.lock().unwrap().remove(&handle);
        Ok(())
    }

    async fn write_variable(
        &self,
        name: &str,
        unit: &str,
        value: f64,
        data_type: DataType,
    ) -> Result<(), ProviderError> {
        self.writes.lock().unwrap().push(WriteCall {
            name: name.to_string(),
            unit: unit.to_string(),
            value,
            data_type,
        });
        Ok(())
    }

    fn read_variable(&self, handle: VariableHandle) -> Option<RawValue> {
        self.values.lock().unwrap().get(&handle).cloned()
    }

    async fn handle_events(
        &self,
        _request_interval: Duration,
        _receive_interval: Duration,
        _listener: Arc<dyn ProviderListener>,
        shutdown: CancellationToken,
    ) {
        shutdown.cancelled().await;
    }
}

#[derive(Default)]
pub(crate) struct CapturingTransport {
    sent: Mutex<BTreeMap<ClientId, Vec<Arc<str>>>>,
    broadcasts: Mutex<Vec<Arc<str>>>,
}

impl CapturingTransport {
    pub(crate) fn sent_to(&self, client_id: &ClientId) -> Vec<Arc<str>> {
        self.sent
            .lock()
            .unwrap()
            .get(client_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn broadcasts(&self) -> Vec<Arc<str>> {
        self.broadcasts.lock().unwrap().clone()
    }
}

impl ClientTransport for CapturingTransport {
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
        self.sent.lock().unwrap().keys().cloned().collect()
    }
}
