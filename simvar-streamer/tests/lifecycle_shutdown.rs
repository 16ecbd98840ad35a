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

mod support;

use integration_test_utils::{GatewayCall, RecordingGateway, RecordingTransport};
use serde_json::json;
use simvar_streamer::{
    ClientId, ConnectionState, LifecycleConfig, LifecycleError, RawValue, SimVarStreamer,
};
use std::time::Duration;
use support::{entry, make_harness};
use tokio::time::Instant;

fn fast_config() -> LifecycleConfig {
    LifecycleConfig {
        retry_interval: Duration::from_secs(1),
        connect_timeout: Duration::from_secs(3),
        request_interval: Duration::from_millis(250),
        ..LifecycleConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn unreachable_provider_times_out_after_about_three_attempts() {
    integration_test_utils::init_logging();
    let gateway = RecordingGateway::unreachable();
    let streamer = SimVarStreamer::new(gateway.clone(), RecordingTransport::new(), fast_config());
    let started = Instant::now();

    let result = streamer.clone().run().await;

    let Err(LifecycleError::ConnectTimeout { attempts, timeout }) = result else {
        panic!("expected connect timeout, got {result:?}");
    };
    assert_eq!(timeout, Duration::from_secs(3));
    assert!((2..=4).contains(&attempts), "attempts = {attempts}");
    assert_eq!(gateway.connect_attempts(), attempts as usize);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_millis(3100));
    assert_eq!(streamer.connection_state(), ConnectionState::Disconnected);
    assert!(!gateway.calls().contains(&GatewayCall::EventLoopStarted));
}

#[tokio::test(start_paused = true)]
async fn data_ready_ticks_push_payloads_while_connected() {
    let harness = make_harness(fast_config());
    let a = ClientId::new("client-a");
    harness.connect(&a).await;
    harness
        .register(&a, "m", vec![entry("AIRSPEED TRUE", "knot", "float64", "spd")])
        .await;
    harness
        .gateway
        .set_value("AIRSPEED TRUE", RawValue::float64(101.5));

    let running = tokio::spawn(harness.streamer.clone().run());
    tokio::time::sleep(Duration::from_millis(1100)).await;
    harness.streamer.shutdown_token().cancel();
    running.await.unwrap().unwrap();

    let sent = harness.transport.sent_to(&a);
    assert!(sent.len() >= 4, "expected several ticks, got {}", sent.len());
    assert_eq!(
        harness.transport.last_json_for(&a),
        Some(json!({"type": "simvars", "meta": "m", "data": {"spd": 101.5}}))
    );
    assert!(harness
        .transport
        .broadcasts()
        .iter()
        .any(|payload| payload.contains(r#""connected":true"#)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_event_loop_before_disconnecting() {
    let harness = make_harness(fast_config());

    let running = tokio::spawn(harness.streamer.clone().run());
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(harness.streamer.connection_state(), ConnectionState::Connected);
    harness.streamer.shutdown_token().cancel();
    running.await.unwrap().unwrap();

    let calls = harness.gateway.calls();
    let position = |wanted: &GatewayCall| calls.iter().position(|call| call == wanted);
    let started = position(&GatewayCall::EventLoopStarted).unwrap();
    let stopped = position(&GatewayCall::EventLoopStopped).unwrap();
    let disconnected = position(&GatewayCall::Disconnect).unwrap();
    assert!(started < stopped);
    assert!(stopped < disconnected);
    assert_eq!(calls.last(), Some(&GatewayCall::Disconnect));
    assert_eq!(
        harness.streamer.connection_state(),
        ConnectionState::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn provider_quit_shuts_the_streamer_down() {
    let harness = make_harness(fast_config());

    let running = tokio::spawn(harness.streamer.clone().run());
    tokio::time::sleep(Duration::from_millis(300)).await;
    harness.gateway.quit();
    running.await.unwrap().unwrap();

    assert!(harness.streamer.shutdown_token().is_cancelled());
    assert_eq!(harness.gateway.calls().last(), Some(&GatewayCall::Disconnect));
    let diagnostics = harness.streamer.diagnostics().await;
    assert_eq!(
        diagnostics.provider_info.map(|info| info.app_name),
        Some("Recording Gateway".to_string())
    );
    assert!(!diagnostics.connected);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_connect_is_reported_as_cancelled() {
    let gateway = RecordingGateway::unreachable();
    let streamer = SimVarStreamer::new(
        gateway,
        RecordingTransport::new(),
        LifecycleConfig::default(),
    );
    let token = streamer.shutdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        token.cancel();
    });

    assert_eq!(streamer.run().await, Err(LifecycleError::Cancelled));
}
