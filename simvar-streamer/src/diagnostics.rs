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

//! Human-readable snapshot of streamer state.

use crate::observability::fields;
use crate::provider::ProviderInfo;
use crate::registry::channel_registry::RegistrationSummary;
use crate::registry::variable_key::VariableKey;
use crate::runtime::connection_lifecycle::ConnectionState;
use crate::transport::ClientId;
use std::fmt::Write;

#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionSummary {
    pub alias: String,
    /// `None` when the handle no longer resolves to a live registration.
    pub variable: Option<VariableKey>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RequestSummary {
    pub client_id: ClientId,
    pub meta: String,
    pub subscriptions: Vec<SubscriptionSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticsReport {
    pub title: String,
    pub provider_info: Option<ProviderInfo>,
    pub state: ConnectionState,
    pub connected: bool,
    pub clients: Vec<ClientId>,
    pub registrations: Vec<RegistrationSummary>,
    pub requests: Vec<RequestSummary>,
}

impl DiagnosticsReport {
    /// Registration table as served on `/simvars`.
    pub fn render_simvars(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.title);
        self.write_registrations(&mut out);
        out
    }

    /// Full dump as served on `/debug`.
    pub fn render_debug(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.title);

        if let Some(info) = &self.provider_info {
            let _ = writeln!(
                out,
                "Provider:\n  name: {}\n  version: {} (build {})\n  api: {} (build {})\n",
                info.app_name, info.app_version, info.app_build, info.api_version, info.api_build
            );
        }
        let _ = writeln!(
            out,
            "Connection\n  state: {:?}\n  connected: {}\n",
            self.state, self.connected
        );

        let _ = writeln!(out, "Clients: {}", self.clients.len());
        for (index, client_id) in self.clients.iter().enumerate() {
            let _ = writeln!(out, "  {:02}: {}", index, client_id);
        }
        out.push('\n');

        self.write_registrations(&mut out);
        out.push('\n');

        let _ = writeln!(out, "Requests: {}", self.requests.len());
        for (index, request) in self.requests.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:02}: client: {} vars: {} meta: {}",
                index + 1,
                request.client_id,
                request.subscriptions.len(),
                request.meta
            );
            for (position, subscription) in request.subscriptions.iter().enumerate() {
                let variable = subscription
                    .variable
                    .as_ref()
                    .map(fields::format_key)
                    .unwrap_or_else(|| fields::NONE.to_string());
                let _ = writeln!(
                    out,
                    "    {:02}: alias: {} variable: {}",
                    position + 1,
                    subscription.alias,
                    variable
                );
            }
        }
        out
    }

    fn write_registrations(&self, out: &mut String) {
        let _ = writeln!(out, "SimVars: {}", self.registrations.len());
        for registration in &self.registrations {
            let _ = writeln!(
                out,
                "  handle: {} variable: {} refs: {}",
                registration.handle,
                fields::format_key(&registration.key),
                registration.ref_count
            );
        }
    }
}
