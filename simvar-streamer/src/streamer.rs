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

//! Public facade wiring the registries, control plane, data plane and lifecycle.

use crate::control_plane::control_dispatcher::{ControlDispatcher, DispatchOutcome};
use crate::data_plane::distribution::{DistributionPipeline, TickReport};
use crate::diagnostics::{DiagnosticsReport, RequestSummary, SubscriptionSummary};
use crate::observability::{events, fields};
use crate::provider::{ProviderGateway, ProviderInfo, ProviderListener};
use crate::registry::SharedRegistry;
use crate::runtime::connection_lifecycle::{
    ConnectionLifecycle, ConnectionState, LifecycleConfig, LifecycleError,
};
use crate::transport::{ClientTransport, TransportEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "streamer";

/// Bridges one provider to any number of transport clients.
///
/// Transport events are fed through [`SimVarStreamer::run_transport_events`] (or one at
/// a time through [`SimVarStreamer::handle_transport_event`]); provider callbacks arrive
/// through the [`ProviderListener`] impl once [`SimVarStreamer::run`] has connected.
pub struct SimVarStreamer {
    name: String,
    gateway: Arc<dyn ProviderGateway>,
    transport: Arc<dyn ClientTransport>,
    registry: Arc<SharedRegistry>,
    dispatcher: ControlDispatcher,
    pipeline: DistributionPipeline,
    lifecycle: ConnectionLifecycle,
    shutdown: CancellationToken,
    provider_info: RwLock<Option<ProviderInfo>>,
}

impl SimVarStreamer {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        transport: Arc<dyn ClientTransport>,
        config: LifecycleConfig,
    ) -> Arc<Self> {
        let registry = Arc::new(SharedRegistry::new(gateway.clone()));
        Arc::new(Self {
            name: config.connection_name.clone(),
            dispatcher: ControlDispatcher::new(registry.clone(), gateway.clone()),
            pipeline: DistributionPipeline::new(registry.clone(), transport.clone()),
            lifecycle: ConnectionLifecycle::new(gateway.clone(), config),
            gateway,
            transport,
            registry,
            shutdown: CancellationToken::new(),
            provider_info: RwLock::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<SharedRegistry> {
        &self.registry
    }

    /// Cancelling this token stops the provider event loop, then the provider connection.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    /// Connects to the provider and drives its callbacks until shutdown.
    ///
    /// Returns once the provider event loop has stopped and the provider has been
    /// disconnected. A connect timeout is returned as an error.
    pub async fn run(self: Arc<Self>) -> Result<(), LifecycleError> {
        let listener: Arc<dyn ProviderListener> = self.clone();
        self.lifecycle.run(listener, self.shutdown.clone()).await
    }

    pub async fn handle_transport_event(&self, event: TransportEvent) -> DispatchOutcome {
        self.dispatcher.handle_event(event).await
    }

    /// Consumes transport events sequentially until the channel closes or shutdown.
    pub async fn run_transport_events(&self, mut receiver: mpsc::Receiver<TransportEvent>) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = receiver.recv() => match event {
                    Some(event) => {
                        self.dispatcher.handle_event(event).await;
                    }
                    None => break,
                },
            }
        }
        debug!(
            event = events::CONTROL_EVENT_LOOP_STOP,
            component = COMPONENT,
            "transport event loop stopped"
        );
    }

    /// Runs one distribution tick outside the provider schedule.
    pub async fn distribute(&self) -> TickReport {
        self.pipeline.run_tick(self.gateway.is_connected()).await
    }

    pub async fn diagnostics(&self) -> DiagnosticsReport {
        let provider_info = self.provider_info.read().await.clone();
        let (registrations, requests) = {
            let state = self.registry.lock().await;
            let mut requests = Vec::with_capacity(state.subscriptions.request_count());
            state.subscriptions.for_each_request(|request| {
                requests.push(RequestSummary {
                    client_id: request.client_id.clone(),
                    meta: request.meta.clone(),
                    subscriptions: request
                        .subscriptions
                        .values()
                        .map(|subscription| SubscriptionSummary {
                            alias: subscription.alias.clone(),
                            variable: state.channels.key_of(subscription.handle).cloned(),
                        })
                        .collect(),
                });
            });
            (state.channels.summaries(), requests)
        };

        DiagnosticsReport {
            title: self.name.clone(),
            provider_info,
            state: self.lifecycle.state(),
            connected: self.gateway.is_connected(),
            clients: self.transport.connected_clients(),
            registrations,
            requests,
        }
    }
}

#[async_trait]
impl ProviderListener for SimVarStreamer {
    async fn on_connected(&self, info: ProviderInfo) {
        info!(
            event = events::PROVIDER_CONNECTED,
            component = COMPONENT,
            app_name = %info.app_name,
            app_version = %info.app_version,
            app_build = %info.app_build,
            api_version = %info.api_version,
            api_build = %info.api_build,
            "provider connection open"
        );
        *self.provider_info.write().await = Some(info);
    }

    async fn on_disconnected(&self) {
        info!(
            event = events::PROVIDER_DISCONNECTED,
            component = COMPONENT,
            reason = fields::REASON_SHUTDOWN,
            "provider quit; shutting down"
        );
        self.shutdown.cancel();
    }

    async fn on_data_ready(&self) {
        self.distribute().await;
    }

    async fn on_event(&self, event_id: u32) {
        debug!(
            event = events::PROVIDER_EVENT,
            component = COMPONENT,
            event_id,
            "provider event"
        );
    }

    async fn on_exception(&self, code: u32) {
        warn!(
            event = events::PROVIDER_EXCEPTION,
            component = COMPONENT,
            code,
            "provider exception"
        );
    }
}
