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

use async_trait::async_trait;
use simvar_streamer::{
    DataType, ProviderError, ProviderGateway, ProviderInfo, ProviderListener, RawValue,
    VariableHandle,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Every gateway interaction, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    Connect(String),
    Disconnect,
    Register {
        name: String,
        unit: String,
        data_type: DataType,
        handle: VariableHandle,
    },
    Unregister(VariableHandle),
    Write {
        name: String,
        unit: String,
        value: f64,
        data_type: DataType,
    },
    EventLoopStarted,
    EventLoopStopped,
}

/// Provider double that records calls and serves values set by variable name.
///
/// While its event loop runs it raises `on_data_ready` once per request interval and
/// `on_disconnected` when [`RecordingGateway::quit`] is called.
pub struct RecordingGateway {
    next_handle: AtomicU32,
    connected: AtomicBool,
    connect_succeeds: AtomicBool,
    rejected: Mutex<HashSet<String>>,
    registrations: Mutex<HashMap<VariableHandle, String>>,
    values: Mutex<HashMap<String, RawValue>>,
    calls: Mutex<Vec<GatewayCall>>,
    quit: Notify,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            next_handle: AtomicU32::new(0),
            connected: AtomicBool::new(false),
            connect_succeeds: AtomicBool::new(true),
            rejected: Mutex::new(HashSet::new()),
            registrations: Mutex::new(HashMap::new()),
            values: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            quit: Notify::new(),
        }
    }
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A gateway whose connect always fails.
    pub fn unreachable() -> Arc<Self> {
        let gateway = Self::default();
        gateway.connect_succeeds.store(false, Ordering::SeqCst);
        Arc::new(gateway)
    }

    pub fn reject_registration(&self, name: &str) {
        self.rejected.lock().unwrap().insert(name.to_string());
    }

    /// Sets the value served for every registration of `name`.
    pub fn set_value(&self, name: &str, value: RawValue) {
        self.values.lock().unwrap().insert(name.to_string(), value);
    }

    /// Makes the running event loop report a provider quit.
    pub fn quit(&self) {
        self.quit.notify_one();
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.count(|call| matches!(call, GatewayCall::Connect(_)))
    }

    pub fn register_count(&self) -> usize {
        self.count(|call| matches!(call, GatewayCall::Register { .. }))
    }

    pub fn unregister_count(&self) -> usize {
        self.count(|call| matches!(call, GatewayCall::Unregister(_)))
    }

    /// `(name, unit, value)` of every write, in order.
    pub fn writes(&self) -> Vec<(String, String, f64)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Write {
                    name, unit, value, ..
                } => Some((name.clone(), unit.clone(), *value)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        debug!("recording gateway call: {call:?}");
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProviderGateway for RecordingGateway {
    async fn connect(&self, name: &str) -> Result<(), ProviderError> {
        self.record(GatewayCall::Connect(name.to_string()));
        if !self.connect_succeeds.load(Ordering::SeqCst) {
            return Err(ProviderError::ConnectFailed(
                "recording gateway is unreachable".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.record(GatewayCall::Disconnect);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn register_variable(
        &self,
        name: &str,
        unit: &str,
        data_type: DataType,
    ) -> Result<VariableHandle, ProviderError> {
        if self.rejected.lock().unwrap().contains(name) {
            return Err(ProviderError::RegistrationFailed {
                name: name.to_string(),
                reason: "unknown simulation variable".to_string(),
            });
        }
        let handle = VariableHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        self.registrations
            .lock()
            .unwrap()
            .insert(handle, name.to_string());
        self.record(GatewayCall::Register {
            name: name.to_string(),
            unit: unit.to_string(),
            data_type,
            handle,
        });
        Ok(handle)
    }

    async fn unregister_variable(&self, handle: VariableHandle) -> Result<(), ProviderError> {
        self.registrations.lock().unwrap().remove(&handle);
        self.record(GatewayCall::Unregister(handle));
        Ok(())
    }

    async fn write_variable(
        &self,
        name: &str,
        unit: &str,
        value: f64,
        data_type: DataType,
    ) -> Result<(), ProviderError> {
        self.record(GatewayCall::Write {
            name: name.to_string(),
            unit: unit.to_string(),
            value,
            data_type,
        });
        Ok(())
    }

    fn read_variable(&self, handle: VariableHandle) -> Option<RawValue> {
        let name = self.registrations.lock().unwrap().get(&handle).cloned()?;
        self.values.lock().unwrap().get(&name).cloned()
    }

    async fn handle_events(
        &self,
        request_interval: Duration,
        _receive_interval: Duration,
        listener: Arc<dyn ProviderListener>,
        shutdown: CancellationToken,
    ) {
        self.record(GatewayCall::EventLoopStarted);
        listener
            .on_connected(ProviderInfo {
                app_name: "Recording Gateway".to_string(),
                app_version: "1.0".to_string(),
                app_build: "1".to_string(),
                api_version: "1.0".to_string(),
                api_build: "1".to_string(),
            })
            .await;

        let mut ticker = tokio::time::interval(request_interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.quit.notified() => listener.on_disconnected().await,
                _ = ticker.tick() => listener.on_data_ready().await,
            }
        }
        self.record(GatewayCall::EventLoopStopped);
    }
}
