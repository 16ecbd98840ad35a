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

//! Refcounted provider registrations keyed by variable identity.

use crate::observability::{events, fields};
use crate::provider::{ProviderError, ProviderGateway, RawValue, VariableHandle};
use crate::registry::variable_key::VariableKey;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

const COMPONENT: &str = "channel_registry";

struct Registration {
    key: VariableKey,
    ref_count: usize,
}

/// Read-only view of one live registration, for diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrationSummary {
    pub handle: VariableHandle,
    pub key: VariableKey,
    pub ref_count: usize,
}

/// Owns every provider registration. At most one registration exists per
/// [`VariableKey`], and its refcount equals the number of subscriptions using it.
#[derive(Default)]
pub struct ChannelRegistry {
    handles: HashMap<VariableKey, VariableHandle>,
    registrations: BTreeMap<VariableHandle, Registration>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, registering it with the provider on first use.
    pub async fn acquire(
        &mut self,
        key: &VariableKey,
        gateway: &dyn ProviderGateway,
    ) -> Result<VariableHandle, ProviderError> {
        if let Some(handle) = self.handles.get(key).copied() {
            if let Some(registration) = self.registrations.get_mut(&handle) {
                registration.ref_count += 1;
                debug!(
                    event = events::CHANNEL_REUSE,
                    component = COMPONENT,
                    variable = %fields::format_key(key),
                    handle = handle.id(),
                    ref_count = registration.ref_count,
                    "reusing provider registration"
                );
                return Ok(handle);
            }
        }

        let handle = match gateway
            .register_variable(key.name(), key.unit(), key.data_type())
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                warn!(
                    event = events::CHANNEL_REGISTER_FAILED,
                    component = COMPONENT,
                    variable = %fields::format_key(key),
                    err = %err,
                    "provider rejected variable registration"
                );
                return Err(err);
            }
        };

        self.handles.insert(key.clone(), handle);
        self.registrations.insert(
            handle,
            Registration {
                key: key.clone(),
                ref_count: 1,
            },
        );
        info!(
            event = events::CHANNEL_REGISTER_OK,
            component = COMPONENT,
            variable = %fields::format_key(key),
            handle = handle.id(),
            "registered provider variable"
        );
        Ok(handle)
    }

    /// Drops one reference to `handle`, deregistering from the provider at zero.
    ///
    /// Releasing an unknown handle is a no-op. Returns `true` when the registration was
    /// removed.
    pub async fn release(&mut self, handle: VariableHandle, gateway: &dyn ProviderGateway) -> bool {
        let Some(registration) = self.registrations.get_mut(&handle) else {
            debug!(
                event = events::CHANNEL_RELEASE_UNKNOWN,
                component = COMPONENT,
                handle = handle.id(),
                "ignoring release of unknown handle"
            );
            return false;
        };

        registration.ref_count = registration.ref_count.saturating_sub(1);
        debug!(
            event = events::CHANNEL_RELEASE,
            component = COMPONENT,
            variable = %fields::format_key(&registration.key),
            handle = handle.id(),
            ref_count = registration.ref_count,
            "released provider registration reference"
        );
        if registration.ref_count > 0 {
            return false;
        }

        let Some(removed) = self.registrations.remove(&handle) else {
            return false;
        };
        self.handles.remove(&removed.key);

        match gateway.unregister_variable(handle).await {
            Ok(()) => info!(
                event = events::CHANNEL_DEREGISTER_OK,
                component = COMPONENT,
                variable = %fields::format_key(&removed.key),
                handle = handle.id(),
                "deregistered provider variable"
            ),
            Err(err) => warn!(
                event = events::CHANNEL_DEREGISTER_FAILED,
                component = COMPONENT,
                variable = %fields::format_key(&removed.key),
                handle = handle.id(),
                err = %err,
                "provider deregistration failed; registration dropped locally"
            ),
        }
        true
    }

    /// Reads the provider's current value for a live registration.
    pub fn value_of(&self, handle: VariableHandle, gateway: &dyn ProviderGateway) -> Option<RawValue> {
        if !self.registrations.contains_key(&handle) {
            return None;
        }
        gateway.read_variable(handle)
    }

    pub fn key_of(&self, handle: VariableHandle) -> Option<&VariableKey> {
        self.registrations
            .get(&handle)
            .map(|registration| &registration.key)
    }

    pub fn handle_of(&self, key: &VariableKey) -> Option<VariableHandle> {
        self.handles.get(key).copied()
    }

    pub fn ref_count(&self, handle: VariableHandle) -> Option<usize> {
        self.registrations
            .get(&handle)
            .map(|registration| registration.ref_count)
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Number of live subscriptions on variables named `name`, across units and types.
    pub fn subscriber_count_for(&self, name: &str) -> usize {
        self.registrations
            .values()
            .filter(|registration| registration.key.name() == name)
            .map(|registration| registration.ref_count)
            .sum()
    }

    /// Live registrations ordered by handle.
    pub fn summaries(&self) -> Vec<RegistrationSummary> {
        self.registrations
            .iter()
            .map(|(handle, registration)| RegistrationSummary {
                handle: *handle,
                key: registration.key.clone(),
                ref_count: registration.ref_count,
            })
            .collect()
    }
}
