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

use integration_test_utils::GatewayCall;
use serde_json::json;
use simvar_streamer::{ClientId, DataType, DispatchOutcome, LifecycleConfig};
use std::collections::BTreeSet;
use support::make_harness;

#[tokio::test]
async fn teleport_issues_seven_float64_writes() {
    let harness = make_harness(LifecycleConfig::default());

    let outcome = harness
        .send(
            &ClientId::new("client-a"),
            json!({"type": "teleport", "data": {
                "latitude": 47.0,
                "longitude": 8.0,
                "altitude": 1200,
                "heading": 90,
                "airspeed": 120
            }}),
        )
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Written {
            succeeded: 7,
            failed: 0
        }
    );
    let writes = harness.gateway.writes();
    assert_eq!(writes.len(), 7);
    let names: BTreeSet<&str> = writes.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(
        names,
        BTreeSet::from([
            "PLANE LATITUDE",
            "PLANE LONGITUDE",
            "PLANE ALTITUDE",
            "PLANE HEADING DEGREES TRUE",
            "AIRSPEED TRUE",
            "PLANE BANK DEGREES",
            "PLANE PITCH DEGREES",
        ])
    );
    let value_of = |wanted: &str| {
        writes
            .iter()
            .find(|(name, _, _)| name == wanted)
            .map(|(_, _, value)| *value)
    };
    assert_eq!(value_of("PLANE LATITUDE"), Some(47.0));
    assert_eq!(value_of("PLANE ALTITUDE"), Some(1200.0));
    assert_eq!(value_of("PLANE BANK DEGREES"), Some(0.0));
    assert_eq!(value_of("PLANE PITCH DEGREES"), Some(0.0));
    assert!(harness.gateway.calls().iter().all(|call| match call {
        GatewayCall::Write { data_type, .. } => *data_type == DataType::Float64,
        _ => true,
    }));
}

#[tokio::test]
async fn setdata_issues_one_write_and_no_registration() {
    let harness = make_harness(LifecycleConfig::default());

    harness
        .send(
            &ClientId::new("client-a"),
            json!({"type": "setdata", "data": {"name": "LIGHT LANDING", "unit": "bool", "value": 1}}),
        )
        .await;

    assert_eq!(
        harness.gateway.writes(),
        vec![("LIGHT LANDING".to_string(), "bool".to_string(), 1.0)]
    );
    assert_eq!(harness.gateway.register_count(), 0);
}

#[tokio::test]
async fn teleport_with_missing_field_writes_nothing() {
    let harness = make_harness(LifecycleConfig::default());

    let outcome = harness
        .send(
            &ClientId::new("client-a"),
            json!({"type": "teleport", "data": {"latitude": 47.0}}),
        )
        .await;

    assert_eq!(outcome, DispatchOutcome::Malformed);
    assert!(harness.gateway.writes().is_empty());
}
