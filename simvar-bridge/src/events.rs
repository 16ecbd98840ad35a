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

//! Canonical structured event names used across `simvar-bridge`.

// Process events.
pub const BRIDGE_START: &str = "bridge_start";
pub const BRIDGE_STOP: &str = "bridge_stop";
pub const BRIDGE_STOP_FAILED: &str = "bridge_stop_failed";
pub const BRIDGE_LISTEN: &str = "bridge_listen";
pub const BRIDGE_SIGNAL_RECEIVED: &str = "bridge_signal_received";
pub const BRIDGE_SIGNAL_UNAVAILABLE: &str = "bridge_signal_unavailable";
pub const BRIDGE_TASK_FAILED: &str = "bridge_task_failed";

// WebSocket transport events.
pub const WS_CLIENT_CONNECTED: &str = "ws_client_connected";
pub const WS_CLIENT_DISCONNECTED: &str = "ws_client_disconnected";
pub const WS_READ_FAILED: &str = "ws_read_failed";
pub const WS_EVENT_DROPPED: &str = "ws_event_dropped";
pub const WS_QUEUE_FULL: &str = "ws_queue_full";

// Simulated provider events.
pub const SIM_CONNECT_ACCEPTED: &str = "sim_connect_accepted";
pub const SIM_EVENT_LOOP_START: &str = "sim_event_loop_start";
pub const SIM_EVENT_LOOP_STOP: &str = "sim_event_loop_stop";
