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

//! In-process stand-in for a flight simulator.
//!
//! Holds one aircraft whose position is dead-reckoned from heading and true airspeed on
//! every request tick. Unknown variables are accepted at registration and read back as
//! missing until a client writes them.

use crate::config::SimulatorConfig;
use crate::events;
use async_trait::async_trait;
use simvar_streamer::{
    DataType, ProviderError, ProviderGateway, ProviderInfo, ProviderListener, RawValue,
    VariableHandle,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const COMPONENT: &str = "simulated_gateway";
const AIRCRAFT_TITLE: &str = "Cessna Skyhawk G1000";
const ATC_ID: &str = "HB-SIM";
const SECONDS_PER_HOUR: f64 = 3600.0;
const NM_PER_DEGREE: f64 = 60.0;

#[derive(Clone, Debug)]
struct Registration {
    name: String,
    data_type: DataType,
}

#[derive(Debug)]
struct Aircraft {
    latitude: f64,
    longitude: f64,
    altitude_ft: f64,
    heading_deg: f64,
    airspeed_kt: f64,
    bank_deg: f64,
    pitch_deg: f64,
    // Values written for variables the model does not simulate.
    other: HashMap<String, f64>,
}

enum Reading {
    Number(f64),
    Text(&'static str),
}

impl Aircraft {
    fn new(config: &SimulatorConfig) -> Self {
        Self {
            latitude: config.start_latitude,
            longitude: config.start_longitude,
            altitude_ft: config.start_altitude_ft,
            heading_deg: config.start_heading_deg,
            airspeed_kt: config.start_airspeed_kt,
            bank_deg: 0.0,
            pitch_deg: 0.0,
            other: HashMap::new(),
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        let distance_nm = self.airspeed_kt * elapsed.as_secs_f64() / SECONDS_PER_HOUR;
        if distance_nm == 0.0 {
            return;
        }
        let heading = self.heading_deg.to_radians();
        self.latitude =
            (self.latitude + distance_nm * heading.cos() / NM_PER_DEGREE).clamp(-90.0, 90.0);
        let meridian_scale = self.latitude.to_radians().cos().abs().max(1e-6);
        self.longitude += distance_nm * heading.sin() / (NM_PER_DEGREE * meridian_scale);
        if self.longitude > 180.0 {
            self.longitude -= 360.0;
        } else if self.longitude < -180.0 {
            self.longitude += 360.0;
        }
    }

    fn read(&self, name: &str) -> Option<Reading> {
        let reading = match name.to_ascii_uppercase().as_str() {
            "PLANE LATITUDE" => Reading::Number(self.latitude),
            "PLANE LONGITUDE" => Reading::Number(self.longitude),
            "PLANE ALTITUDE" | "INDICATED ALTITUDE" => Reading::Number(self.altitude_ft),
            "PLANE HEADING DEGREES TRUE" | "PLANE HEADING DEGREES MAGNETIC" => {
                Reading::Number(self.heading_deg)
            }
            "AIRSPEED TRUE" | "AIRSPEED INDICATED" | "GROUND VELOCITY" => {
                Reading::Number(self.airspeed_kt)
            }
            "PLANE BANK DEGREES" => Reading::Number(self.bank_deg),
            "PLANE PITCH DEGREES" => Reading::Number(self.pitch_deg),
            "TITLE" => Reading::Text(AIRCRAFT_TITLE),
            "ATC ID" => Reading::Text(ATC_ID),
            other => Reading::Number(*self.other.get(other)?),
        };
        Some(reading)
    }

    fn write(&mut self, name: &str, value: f64) {
        let name = name.to_ascii_uppercase();
        match name.as_str() {
            "PLANE LATITUDE" => self.latitude = value,
            "PLANE LONGITUDE" => self.longitude = value,
            "PLANE ALTITUDE" => self.altitude_ft = value,
            "PLANE HEADING DEGREES TRUE" => self.heading_deg = value.rem_euclid(360.0),
            "AIRSPEED TRUE" => self.airspeed_kt = value.max(0.0),
            "PLANE BANK DEGREES" => self.bank_deg = value,
            "PLANE PITCH DEGREES" => self.pitch_deg = value,
            _ => {
                self.other.insert(name, value);
            }
        }
    }
}

struct SimulatorState {
    aircraft: Aircraft,
    registrations: HashMap<VariableHandle, Registration>,
}

/// [`ProviderGateway`] backed by the in-process aircraft model.
pub struct SimulatedGateway {
    started: Instant,
    connect_delay: Duration,
    connected: AtomicBool,
    next_handle: AtomicU32,
    state: Mutex<SimulatorState>,
}

impl SimulatedGateway {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            started: Instant::now(),
            connect_delay: Duration::from_millis(config.connect_delay_ms),
            connected: AtomicBool::new(false),
            next_handle: AtomicU32::new(1),
            state: Mutex::new(SimulatorState {
                aircraft: Aircraft::new(config),
                registrations: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_connected(&self) -> Result<(), ProviderError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ProviderError::NotConnected)
        }
    }

    fn provider_info() -> ProviderInfo {
        ProviderInfo {
            app_name: "SimVarBridge Simulator".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            app_build: "0".to_string(),
            api_version: "1".to_string(),
            api_build: "0".to_string(),
        }
    }
}

#[async_trait]
impl ProviderGateway for SimulatedGateway {
    async fn connect(&self, name: &str) -> Result<(), ProviderError> {
        if self.started.elapsed() < self.connect_delay {
            return Err(ProviderError::ConnectFailed(
                "simulator is still starting".to_string(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        info!(
            event = events::SIM_CONNECT_ACCEPTED,
            component = COMPONENT,
            connection_name = name,
            "simulator accepted connection"
        );
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.connected.store(false, Ordering::SeqCst);
        self.state().registrations.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn register_variable(
        &self,
        name: &str,
        _unit: &str,
        data_type: DataType,
    ) -> Result<VariableHandle, ProviderError> {
        self.ensure_connected()?;
        if name.trim().is_empty() {
            return Err(ProviderError::RegistrationFailed {
                name: name.to_string(),
                reason: "empty variable name".to_string(),
            });
        }
        let handle = VariableHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.state().registrations.insert(
            handle,
            Registration {
                name: name.to_string(),
                data_type,
            },
        );
        Ok(handle)
    }

    async fn unregister_variable(&self, handle: VariableHandle) -> Result<(), ProviderError> {
        match self.state().registrations.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(ProviderError::DeregistrationFailed {
                handle,
                reason: "unknown handle".to_string(),
            }),
        }
    }

    async fn write_variable(
        &self,
        name: &str,
        _unit: &str,
        value: f64,
        _data_type: DataType,
    ) -> Result<(), ProviderError> {
        self.ensure_connected()?;
        if !value.is_finite() {
            return Err(ProviderError::WriteFailed {
                name: name.to_string(),
                reason: "value is not finite".to_string(),
            });
        }
        self.state().aircraft.write(name, value);
        Ok(())
    }

    fn read_variable(&self, handle: VariableHandle) -> Option<RawValue> {
        let state = self.state();
        let registration = state.registrations.get(&handle)?;
        let raw = match state.aircraft.read(&registration.name)? {
            Reading::Number(value) => RawValue::from_f64(registration.data_type, value),
            Reading::Text(text) if registration.data_type.is_string() => {
                RawValue::string(registration.data_type, text)
            }
            Reading::Text(_) => return None,
        };
        Some(raw)
    }

    async fn handle_events(
        &self,
        request_interval: Duration,
        receive_interval: Duration,
        listener: Arc<dyn ProviderListener>,
        shutdown: CancellationToken,
    ) {
        debug!(
            event = events::SIM_EVENT_LOOP_START,
            component = COMPONENT,
            request_interval_ms = request_interval.as_millis() as u64,
            receive_interval_ms = receive_interval.as_millis() as u64,
            "simulator event loop started"
        );
        listener.on_connected(Self::provider_info()).await;

        let mut ticker = tokio::time::interval(request_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        let mut last_tick = Instant::now();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let now = Instant::now();
                    self.state().aircraft.advance(now - last_tick);
                    last_tick = now;
                    listener.on_data_ready().await;
                }
            }
        }
        debug!(
            event = events::SIM_EVENT_LOOP_STOP,
            component = COMPONENT,
            "simulator event loop stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedGateway;
    use crate::config::SimulatorConfig;
use crate::events;
    use async_trait::async_trait;
    use simvar_streamer::{
        DataType, ProviderError, ProviderGateway, ProviderInfo, ProviderListener, RawValue,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn config() -> SimulatorConfig {
        SimulatorConfig {
            connect_delay_ms: 0,
            start_latitude: 0.0,
            start_longitude: 0.0,
            start_heading_deg: 0.0,
            start_airspeed_kt: 0.0,
            ..SimulatorConfig::default()
        }
    }

    fn float(raw: Option<RawValue>) -> f64 {
        let bytes: [u8; 8] = raw.unwrap().bytes.try_into().unwrap();
        f64::from_le_bytes(bytes)
    }

    #[derive(Default)]
    struct TickCounter {
        connected: AtomicUsize,
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl ProviderListener for TickCounter {
        async fn on_connected(&self, _info: ProviderInfo) {
            self.connected.fetch_add(1, Ordering::SeqCst);
        }
        async fn on_disconnected(&self) {}
        async fn on_data_ready(&self) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
        async fn on_event(&self, _event_id: u32) {}
        async fn on_exception(&self, _code: u32) {}
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_connections_until_started() {
        let gateway = SimulatedGateway::new(&SimulatorConfig {
            connect_delay_ms: 2000,
            ..config()
        });

        assert!(matches!(
            gateway.connect("test").await,
            Err(ProviderError::ConnectFailed(_))
        ));
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert_eq!(gateway.connect("test").await, Ok(()));
        assert!(gateway.is_connected());
    }

    #[tokio::test]
    async fn requires_connection_for_registration_and_writes() {
        let gateway = SimulatedGateway::new(&config());

        assert_eq!(
            gateway
                .register_variable("PLANE ALTITUDE", "feet", DataType::Float64)
                .await,
            Err(ProviderError::NotConnected)
        );
        assert_eq!(
            gateway
                .write_variable("PLANE ALTITUDE", "feet", 1.0, DataType::Float64)
                .await,
            Err(ProviderError::NotConnected)
        );
    }

    #[tokio::test]
    async fn written_values_are_read_back_in_declared_type() {
        let gateway = SimulatedGateway::new(&config());
        gateway.connect("test").await.unwrap();
        let altitude = gateway
            .register_variable("PLANE ALTITUDE", "feet", DataType::Int32)
            .await
            .unwrap();
        let flaps = gateway
            .register_variable("FLAPS HANDLE INDEX", "number", DataType::Float64)
            .await
            .unwrap();
        let title = gateway
            .register_variable("TITLE", "", DataType::String256)
            .await
            .unwrap();

        assert_eq!(gateway.read_variable(flaps), None);
        gateway
            .write_variable("PLANE ALTITUDE", "feet", 4500.7, DataType::Float64)
            .await
            .unwrap();
        gateway
            .write_variable("FLAPS HANDLE INDEX", "number", 2.0, DataType::Float64)
            .await
            .unwrap();

        assert_eq!(gateway.read_variable(altitude), Some(RawValue::int32(4500)));
        assert_eq!(float(gateway.read_variable(flaps)), 2.0);
        assert_eq!(
            gateway.read_variable(title),
            Some(RawValue::string(DataType::String256, "Cessna Skyhawk G1000"))
        );
    }

    #[tokio::test]
    async fn handles_are_sequential_and_released() {
        let gateway = SimulatedGateway::new(&config());
        gateway.connect("test").await.unwrap();

        let first = gateway
            .register_variable("AIRSPEED TRUE", "knot", DataType::Float64)
            .await
            .unwrap();
        let second = gateway
            .register_variable("AIRSPEED TRUE", "knot", DataType::Float64)
            .await
            .unwrap();

        assert_eq!(second.id(), first.id() + 1);
        assert_eq!(gateway.unregister_variable(first).await, Ok(()));
        assert_eq!(gateway.read_variable(first), None);
        assert!(gateway.unregister_variable(first).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn event_loop_ticks_and_moves_the_aircraft() {
        let gateway = Arc::new(SimulatedGateway::new(&config()));
        gateway.connect("test").await.unwrap();
        let latitude = gateway
            .register_variable("PLANE LATITUDE", "degrees", DataType::Float64)
            .await
            .unwrap();
        // 3600 knots due north covers one degree of latitude per minute.
        gateway
            .write_variable("AIRSPEED TRUE", "knot", 3600.0, DataType::Float64)
            .await
            .unwrap();
        let listener = Arc::new(TickCounter::default());
        let shutdown = CancellationToken::new();

        let running = tokio::spawn({
            let gateway = gateway.clone();
            let listener = listener.clone();
            let shutdown = shutdown.clone();
            async move {
                gateway
                    .handle_events(
                        Duration::from_millis(250),
                        Duration::from_millis(1),
                        listener,
                        shutdown,
                    )
                    .await
            }
        });
        tokio::time::sleep(Duration::from_secs(60) + Duration::from_millis(100)).await;
        shutdown.cancel();
        running.await.unwrap();

        assert_eq!(listener.connected.load(Ordering::SeqCst), 1);
        assert_eq!(listener.ticks.load(Ordering::SeqCst), 240);
        let moved = float(gateway.read_variable(latitude));
        assert!((moved - 1.0).abs() < 1e-6, "latitude = {moved}");
    }
}
