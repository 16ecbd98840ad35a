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

//! Per-client subscription requests.

use crate::observability::{events, fields};
use crate::provider::{DataType, ProviderGateway, VariableHandle};
use crate::registry::channel_registry::ChannelRegistry;
use crate::registry::variable_key::VariableKey;
use crate::transport::ClientId;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const COMPONENT: &str = "subscription_registry";

/// One entry of a register control message, already type-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionEntry {
    pub name: String,
    pub unit: String,
    pub data_type: DataType,
    pub alias: String,
}

impl SubscriptionEntry {
    pub fn key(&self) -> VariableKey {
        VariableKey::new(self.name.clone(), self.unit.clone(), self.data_type)
    }
}

/// A client's interest in one registration under an alias of its choosing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub client_id: ClientId,
    pub alias: String,
    pub handle: VariableHandle,
    pub meta: String,
}

/// A client's full subscription set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub client_id: ClientId,
    pub meta: String,
    pub subscriptions: BTreeMap<String, Subscription>,
}

/// What an upsert did with the submitted entries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpsertOutcome {
    pub accepted: usize,
    pub dropped: usize,
    /// Subscriptions of the replaced request that were released.
    pub released: usize,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    requests: BTreeMap<ClientId, Request>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `client_id`'s request with one built from `entries`.
    ///
    /// New entries are acquired before the previous request is released, so a variable
    /// that stays subscribed keeps its provider registration. Entries the provider
    /// rejects are dropped. A repeated alias keeps the last entry.
    pub async fn upsert_request(
        &mut self,
        channels: &mut ChannelRegistry,
        gateway: &dyn ProviderGateway,
        client_id: &ClientId,
        meta: &str,
        entries: Vec<SubscriptionEntry>,
    ) -> UpsertOutcome {
        let mut outcome = UpsertOutcome::default();
        let mut subscriptions: BTreeMap<String, Subscription> = BTreeMap::new();

        for entry in entries {
            if entry.name.is_empty() || entry.alias.is_empty() {
                warn!(
                    event = events::REQUEST_ENTRY_DROPPED,
                    component = COMPONENT,
                    client_id = %client_id,
                    alias = %entry.alias,
                    reason = fields::REASON_INVALID_ENTRY,
                    "dropping subscription entry without name or alias"
                );
                outcome.dropped += 1;
                continue;
            }

            let key = entry.key();
            let handle = match channels.acquire(&key, gateway).await {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(
                        event = events::REQUEST_ENTRY_DROPPED,
                        component = COMPONENT,
                        client_id = %client_id,
                        alias = %entry.alias,
                        variable = %fields::format_key(&key),
                        reason = fields::REASON_PROVIDER_REJECTED,
                        err = %err,
                        "dropping subscription entry"
                    );
                    outcome.dropped += 1;
                    continue;
                }
            };

            let subscription = Subscription {
                client_id: client_id.clone(),
                alias: entry.alias.clone(),
                handle,
                meta: meta.to_string(),
            };
            if let Some(overwritten) = subscriptions.insert(entry.alias.clone(), subscription) {
                debug!(
                    event = events::REQUEST_ALIAS_OVERWRITTEN,
                    component = COMPONENT,
                    client_id = %client_id,
                    alias = %entry.alias,
                    handle = overwritten.handle.id(),
                    reason = fields::REASON_ALIAS_REPLACED,
                    "alias listed twice; keeping the last entry"
                );
                channels.release(overwritten.handle, gateway).await;
                outcome.accepted -= 1;
            }
            outcome.accepted += 1;
        }

        let replaced = self.requests.insert(
            client_id.clone(),
            Request {
                client_id: client_id.clone(),
                meta: meta.to_string(),
                subscriptions,
            },
        );

        if let Some(previous) = replaced {
            for subscription in previous.subscriptions.values() {
                channels.release(subscription.handle, gateway).await;
                outcome.released += 1;
            }
            info!(
                event = events::REQUEST_REPLACE,
                component = COMPONENT,
                client_id = %client_id,
                meta = %meta,
                accepted = outcome.accepted,
                dropped = outcome.dropped,
                released = outcome.released,
                "replaced client request"
            );
        } else {
            info!(
                event = events::REQUEST_UPSERT,
                component = COMPONENT,
                client_id = %client_id,
                meta = %meta,
                accepted = outcome.accepted,
                dropped = outcome.dropped,
                "stored client request"
            );
        }

        outcome
    }

    /// Releases and forgets `client_id`'s request. Returns `false` when there was none.
    pub async fn remove_request(
        &mut self,
        channels: &mut ChannelRegistry,
        gateway: &dyn ProviderGateway,
        client_id: &ClientId,
    ) -> bool {
        let Some(request) = self.requests.remove(client_id) else {
            debug!(
                event = events::REQUEST_REMOVE_UNKNOWN,
                component = COMPONENT,
                client_id = %client_id,
                "no request to remove"
            );
            return false;
        };

        for subscription in request.subscriptions.values() {
            channels.release(subscription.handle, gateway).await;
        }
        info!(
            event = events::REQUEST_REMOVE,
            component = COMPONENT,
            client_id = %client_id,
            released = request.subscriptions.len(),
            "removed client request"
        );
        true
    }

    /// Visits requests in client-id order.
    pub fn for_each_request<F>(&self, mut visit: F)
    where
        F: FnMut(&Request),
    {
        for request in self.requests.values() {
            visit(request);
        }
    }

    pub fn request(&self, client_id: &ClientId) -> Option<&Request> {
        self.requests.get(client_id)
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{SubscriptionEntry, SubscriptionRegistry, UpsertOutcome};
    use crate::provider::DataType;
    use crate::registry::channel_registry::ChannelRegistry;
    use crate::test_doubles::CountingGateway;
    use crate::transport::ClientId;

    fn entry(name: &str, alias: &str) -> SubscriptionEntry {
        SubscriptionEntry {
            name: name.to_string(),
            unit: "knot".to_string(),
            data_type: DataType::Float64,
            alias: alias.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_drops_rejected_entries_and_keeps_the_rest() {
        let gateway = CountingGateway::rejecting("BOGUS VAR");
        let mut channels = ChannelRegistry::new();
        let mut requests = SubscriptionRegistry::new();
        let client = ClientId::new("a");

        let outcome = requests
            .upsert_request(
                &mut channels,
                &gateway,
                &client,
                "panel1",
                vec![entry("AIRSPEED TRUE", "spd"), entry("BOGUS VAR", "bogus")],
            )
            .await;

        assert_eq!(
            outcome,
            UpsertOutcome {
                accepted: 1,
                dropped: 1,
                released: 0
            }
        );
        let request = requests.request(&client).unwrap();
        assert_eq!(request.meta, "panel1");
        assert!(request.subscriptions.contains_key("spd"));
        assert!(!request.subscriptions.contains_key("bogus"));
    }

    #[tokio::test]
    async fn duplicate_alias_keeps_last_entry_and_releases_first() {
        let gateway = CountingGateway::default();
        let mut channels = ChannelRegistry::new();
        let mut requests = SubscriptionRegistry::new();
        let client = ClientId::new("a");

        let outcome = requests
            .upsert_request(
                &mut channels,
                &gateway,
                &client,
                "",
                vec![entry("AIRSPEED TRUE", "x"), entry("PLANE ALTITUDE", "x")],
            )
            .await;

        assert_eq!(outcome.accepted, 1);
        assert_eq!(channels.registration_count(), 1);
        assert_eq!(channels.subscriber_count_for("AIRSPEED TRUE"), 0);
        assert_eq!(channels.subscriber_count_for("PLANE ALTITUDE"), 1);
    }

    #[tokio::test]
    async fn replace_keeps_registration_for_variables_still_listed() {
        let gateway = CountingGateway::default();
        let mut channels = ChannelRegistry::new();
        let mut requests = SubscriptionRegistry::new();
        let client = ClientId::new("a");

        requests
            .upsert_request(
                &mut channels,
                &gateway,
                &client,
                "",
                vec![entry("AIRSPEED TRUE", "spd"), entry("PLANE ALTITUDE", "alt")],
            )
            .await;
        let outcome = requests
            .upsert_request(
                &mut channels,
                &gateway,
                &client,
                "",
                vec![entry("AIRSPEED TRUE", "speed")],
            )
            .await;

        assert_eq!(outcome.released, 2);
        assert_eq!(gateway.register_calls(), 2);
        assert_eq!(gateway.unregister_calls(), 1);
        assert_eq!(channels.subscriber_count_for("AIRSPEED TRUE"), 1);
        let request = requests.request(&client).unwrap();
        assert_eq!(
            request.subscriptions.keys().collect::<Vec<_>>(),
            vec!["speed"]
        );
    }

    #[tokio::test]
    async fn remove_request_is_idempotent() {
        let gateway = CountingGateway::default();
        let mut channels = ChannelRegistry::new();
        let mut requests = SubscriptionRegistry::new();
        let client = ClientId::new("a");
        requests
            .upsert_request(
                &mut channels,
                &gateway,
                &client,
                "",
                vec![entry("AIRSPEED TRUE", "spd")],
            )
            .await;

        assert!(requests.remove_request(&mut channels, &gateway, &client).await);
        assert!(!requests.remove_request(&mut channels, &gateway, &client).await);
        assert_eq!(requests.request_count(), 0);
        assert_eq!(channels.registration_count(), 0);
        assert_eq!(gateway.unregister_calls(), 1);

        let mut seen = Vec::new();
        requests.for_each_request(|request| seen.push(request.client_id.clone()));
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn entries_without_alias_are_dropped() {
        let gateway = CountingGateway::default();
        let mut channels = ChannelRegistry::new();
        let mut requests = SubscriptionRegistry::new();

        let outcome = requests
            .upsert_request(
                &mut channels,
                &gateway,
                &ClientId::new("a"),
                "",
                vec![entry("AIRSPEED TRUE", "")],
            )
            .await;

        assert_eq!(outcome.dropped, 1);
        assert_eq!(gateway.register_calls(), 0);
    }
}
