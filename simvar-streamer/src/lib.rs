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

//! # simvar-streamer
//!
//! `simvar-streamer` bridges a telemetry provider exposing named simulation variables to
//! any number of connected clients, each subscribing to its own variables under aliases
//! of its choosing.
//!
//! Client subscriptions are multiplexed onto a minimal set of provider registrations:
//! one registration per distinct `(name, unit, type)`, reference counted across every
//! client that asks for it. On each provider data-ready tick every client receives one
//! `simvars` payload built from its own subscriptions, followed by a shared `status`
//! broadcast.
//!
//! Typical usage is API-first and centered on [`SimVarStreamer`], with the provider and
//! the client transport supplied as [`ProviderGateway`] and [`ClientTransport`] trait
//! objects. Internal modules are organized by domain layer.
//!
//! ## Subscribe and distribute
//!
//! ```
//! use integration_test_utils::{RecordingGateway, RecordingTransport};
//! use simvar_streamer::{ClientId, LifecycleConfig, RawValue, SimVarStreamer, TransportEvent};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = RecordingGateway::new();
//! let transport = RecordingTransport::new();
//! let streamer = SimVarStreamer::new(
//!     gateway.clone(),
//!     transport.clone(),
//!     LifecycleConfig::default(),
//! );
//!
//! let client = ClientId::new("panel");
//! streamer
//!     .handle_transport_event(TransportEvent::ClientMessage(
//!         client.clone(),
//!         br#"{"type":"register","meta":"panel1","data":[
//!             {"name":"AIRSPEED TRUE","unit":"knot","type":"float64","moniker":"spd"}
//!         ]}"#
//!         .to_vec(),
//!     ))
//!     .await;
//!
//! gateway.set_value("AIRSPEED TRUE", RawValue::float64(123.4));
//! streamer.distribute().await;
//!
//! assert_eq!(
//!     &*transport.sent_to(&client)[0],
//!     r#"{"type":"simvars","meta":"panel1","data":{"spd":123.4}}"#
//! );
//! # });
//! ```
//!
//! ## Shutdown order
//!
//! [`SimVarStreamer::run`] connects with retries and then drives the provider's event
//! loop. Cancelling [`SimVarStreamer::shutdown_token`] (or a provider quit) stops that
//! loop first and disconnects the provider afterwards; stopping the client transport is
//! left to the caller once `run` has returned.
//!
//! ```
//! use integration_test_utils::{GatewayCall, RecordingGateway, RecordingTransport};
//! use simvar_streamer::{LifecycleConfig, SimVarStreamer};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = RecordingGateway::new();
//! let streamer = SimVarStreamer::new(
//!     gateway.clone(),
//!     RecordingTransport::new(),
//!     LifecycleConfig::default(),
//! );
//!
//! let running = tokio::spawn(streamer.clone().run());
//! gateway.quit();
//! running.await.unwrap().unwrap();
//!
//! let calls = gateway.calls();
//! assert_eq!(calls.last(), Some(&GatewayCall::Disconnect));
//! assert!(calls.contains(&GatewayCall::EventLoopStopped));
//! # });
//! ```

pub mod control_plane;
pub mod data_plane;
mod diagnostics;
pub mod observability;
mod provider;
pub mod registry;
pub mod runtime;
mod streamer;
mod transport;

#[cfg(test)]
mod test_doubles;

pub use control_plane::control_dispatcher::DispatchOutcome;
pub use data_plane::distribution::TickReport;
pub use diagnostics::{DiagnosticsReport, RequestSummary, SubscriptionSummary};
pub use provider::{
    DataType, ProviderError, ProviderGateway, ProviderInfo, ProviderListener, RawValue,
    UnknownDataType, VariableHandle,
};
pub use registry::subscription_registry::{SubscriptionEntry, UpsertOutcome};
pub use registry::{SharedRegistry, VariableKey};
pub use runtime::connection_lifecycle::{ConnectionState, LifecycleConfig, LifecycleError};
pub use streamer::SimVarStreamer;
pub use transport::{ClientId, ClientTransport, TransportEvent};
