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

//! Canonical structured event names used across `simvar-streamer`.

// Channel registry events.
pub const CHANNEL_REGISTER_OK: &str = "channel_register_ok";
pub const CHANNEL_REGISTER_FAILED: &str = "channel_register_failed";
pub const CHANNEL_REUSE: &str = "channel_reuse";
pub const CHANNEL_RELEASE: &str = "channel_release";
pub const CHANNEL_RELEASE_UNKNOWN: &str = "channel_release_unknown";
pub const CHANNEL_DEREGISTER_OK: &str = "channel_deregister_ok";
pub const CHANNEL_DEREGISTER_FAILED: &str = "channel_deregister_failed";

// Subscription registry events.
pub const REQUEST_UPSERT: &str = "request_upsert";
pub const REQUEST_REPLACE: &str = "request_replace";
pub const REQUEST_REMOVE: &str = "request_remove";
pub const REQUEST_REMOVE_UNKNOWN: &str = "request_remove_unknown";
pub const REQUEST_ENTRY_DROPPED: &str = "request_entry_dropped";
pub const REQUEST_ALIAS_OVERWRITTEN: &str = "request_alias_overwritten";

// Control-plane events.
pub const CONTROL_CLIENT_CONNECTED: &str = "control_client_connected";
pub const CONTROL_CLIENT_DISCONNECTED: &str = "control_client_disconnected";
pub const CONTROL_MESSAGE_DECODED: &str = "control_message_decoded";
pub const CONTROL_MESSAGE_MALFORMED: &str = "control_message_malformed";
pub const CONTROL_MESSAGE_UNKNOWN: &str = "control_message_unknown";
pub const CONTROL_WRITE_OK: &str = "control_write_ok";
pub const CONTROL_WRITE_FAILED: &str = "control_write_failed";
pub const CONTROL_TELEPORT: &str = "control_teleport";
pub const CONTROL_EVENT_LOOP_STOP: &str = "control_event_loop_stop";

// Data-plane events.
pub const DISTRIBUTION_TICK: &str = "distribution_tick";
pub const DISTRIBUTION_VALUE_DECODE_FAILED: &str = "distribution_value_decode_failed";
pub const DISTRIBUTION_ENCODE_FAILED: &str = "distribution_encode_failed";

// Runtime/lifecycle events.
pub const LIFECYCLE_CONNECT_START: &str = "lifecycle_connect_start";
pub const LIFECYCLE_CONNECT_PROGRESS: &str = "lifecycle_connect_progress";
pub const LIFECYCLE_CONNECT_OK: &str = "lifecycle_connect_ok";
pub const LIFECYCLE_CONNECT_TIMEOUT: &str = "lifecycle_connect_timeout";
pub const LIFECYCLE_CONNECT_CANCELLED: &str = "lifecycle_connect_cancelled";
pub const LIFECYCLE_EVENT_LOOP_START: &str = "lifecycle_event_loop_start";
pub const LIFECYCLE_EVENT_LOOP_STOP: &str = "lifecycle_event_loop_stop";
pub const LIFECYCLE_DISCONNECT_OK: &str = "lifecycle_disconnect_ok";
pub const LIFECYCLE_DISCONNECT_FAILED: &str = "lifecycle_disconnect_failed";

// Provider callback events.
pub const PROVIDER_CONNECTED: &str = "provider_connected";
pub const PROVIDER_DISCONNECTED: &str = "provider_disconnected";
pub const PROVIDER_EVENT: &str = "provider_event";
pub const PROVIDER_EXCEPTION: &str = "provider_exception";
