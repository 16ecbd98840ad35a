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

//! Registry layer.
//!
//! Owns the refcounted provider registrations ([`ChannelRegistry`]) and the per-client
//! requests that reference them ([`SubscriptionRegistry`]). Both live behind one mutex
//! in [`SharedRegistry`]; every operation holds it for its full duration, including the
//! provider calls a refcount transition triggers, so no two live handles can exist for
//! one key.

pub mod channel_registry;
pub mod subscription_registry;
pub mod variable_key;

use crate::provider::{ProviderError, ProviderGateway, RawValue, VariableHandle};
use crate::transport::ClientId;
use channel_registry::ChannelRegistry;
use std::sync::Arc;
use subscription_registry::{Request, SubscriptionEntry, SubscriptionRegistry, UpsertOutcome};
use tokio::sync::{Mutex, MutexGuard};

pub use variable_key::VariableKey;

pub(crate) struct RegistryState {
    pub(crate) channels: ChannelRegistry,
    pub(crate) subscriptions: SubscriptionRegistry,
}

/// Registry pair guarded by a single lock, shared by the control and data planes.
pub struct SharedRegistry {
    gateway: Arc<dyn ProviderGateway>,
    state: Mutex<RegistryState>,
}

impl SharedRegistry {
    pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(RegistryState {
                channels: ChannelRegistry::new(),
                subscriptions: SubscriptionRegistry::new(),
            }),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().await
    }

    pub(crate) fn gateway(&self) -> &dyn ProviderGateway {
        self.gateway.as_ref()
    }

    pub async fn acquire(&self, key: &VariableKey) -> Result<VariableHandle, ProviderError> {
        let mut state = self.state.lock().await;
        state.channels.acquire(key, self.gateway.as_ref()).await
    }

    pub async fn release(&self, handle: VariableHandle) -> bool {
        let mut state = self.state.lock().await;
        state.channels.release(handle, self.gateway.as_ref()).await
    }

    pub async fn value_of(&self, handle: VariableHandle) -> Option<RawValue> {
        let state = self.state.lock().await;
        state.channels.value_of(handle, self.gateway.as_ref())
    }

    pub async fn upsert_request(
        &self,
        client_id: &ClientId,
        meta: &str,
        entries: Vec<SubscriptionEntry>,
    ) -> UpsertOutcome {
        let mut state = self.state.lock().await;
        let RegistryState {
            channels,
            subscriptions,
        } = &mut *state;
        subscriptions
            .upsert_request(channels, self.gateway.as_ref(), client_id, meta, entries)
            .await
    }

    pub async fn remove_request(&self, client_id: &ClientId) -> bool {
        let mut state = self.state.lock().await;
        let RegistryState {
            channels,
            subscriptions,
        } = &mut *state;
        subscriptions
            .remove_request(channels, self.gateway.as_ref(), client_id)
            .await
    }

    /// Runs `visit` over every live request while holding the registry lock.
    pub async fn for_each_request<F>(&self, visit: F)
    where
        F: FnMut(&Request),
    {
        let state = self.state.lock().await;
        state.subscriptions.for_each_request(visit);
    }

    pub async fn request(&self, client_id: &ClientId) -> Option<Request> {
        let state = self.state.lock().await;
        state.subscriptions.request(client_id).cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.subscriptions.request_count()
    }

    /// Live subscriptions on variables named `name`, read from registration refcounts.
    pub async fn subscriber_count_for(&self, name: &str) -> usize {
        self.state.lock().await.channels.subscriber_count_for(name)
    }

    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.channels.registration_count()
    }

    pub async fn ref_count_of(&self, key: &VariableKey) -> Option<usize> {
        let state = self.state.lock().await;
        state
            .channels
            .handle_of(key)
            .and_then(|handle| state.channels.ref_count(handle))
    }
}
