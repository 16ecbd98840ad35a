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

//! Connect/retry/timeout state machine against the provider.

use crate::observability::{events, fields};
use crate::provider::{ProviderGateway, ProviderListener};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "connection_lifecycle";
const PROGRESS_LOG_EVERY: u32 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleConfig {
    /// Name the provider shows for this client.
    pub connection_name: String,
    pub retry_interval: Duration,
    pub connect_timeout: Duration,
    /// Passed through to the gateway's event loop.
    pub request_interval: Duration,
    /// Passed through to the gateway's event loop.
    pub receive_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            connection_name: "SimVarBridge".to_string(),
            retry_interval: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(600),
            request_interval: Duration::from_millis(250),
            receive_interval: Duration::from_millis(1),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LifecycleError {
    /// The provider could not be reached before the connect timeout.
    ConnectTimeout { timeout: Duration, attempts: u32 },
    /// Shutdown was requested before a connection was made.
    Cancelled,
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::ConnectTimeout { timeout, attempts } => write!(
                f,
                "could not connect to provider within {}s ({} attempts)",
                timeout.as_secs_f64(),
                attempts
            ),
            LifecycleError::Cancelled => write!(f, "connect cancelled by shutdown"),
        }
    }
}

impl Error for LifecycleError {}

pub struct ConnectionLifecycle {
    gateway: Arc<dyn ProviderGateway>,
    config: LifecycleConfig,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionLifecycle {
    pub fn new(gateway: Arc<dyn ProviderGateway>, config: LifecycleConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            gateway,
            config,
            state,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn transition(&self, next: ConnectionState) {
        self.state.send_replace(next);
    }

    /// Attempts to connect immediately and then once per retry interval until a connect
    /// succeeds, the timeout elapses, or `shutdown` is cancelled.
    ///
    /// Returns the number of attempts made.
    pub async fn connect(&self, shutdown: &CancellationToken) -> Result<u32, LifecycleError> {
        self.transition(ConnectionState::Connecting);
        info!(
            event = events::LIFECYCLE_CONNECT_START,
            component = COMPONENT,
            connection_name = %self.config.connection_name,
            timeout_secs = self.config.connect_timeout.as_secs(),
            "connecting to provider"
        );

        // A timeout too large for the clock never expires.
        let deadline = Instant::now().checked_add(self.config.connect_timeout);
        let expiry = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);
        let mut retry = tokio::time::interval(self.config.retry_interval);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.transition(ConnectionState::Disconnected);
                    info!(
                        event = events::LIFECYCLE_CONNECT_CANCELLED,
                        component = COMPONENT,
                        attempts,
                        reason = fields::REASON_SHUTDOWN,
                        "connect cancelled"
                    );
                    return Err(LifecycleError::Cancelled);
                }
                _ = &mut expiry => {
                    self.transition(ConnectionState::Disconnected);
                    warn!(
                        event = events::LIFECYCLE_CONNECT_TIMEOUT,
                        component = COMPONENT,
                        attempts,
                        "provider connect timed out"
                    );
                    return Err(LifecycleError::ConnectTimeout {
                        timeout: self.config.connect_timeout,
                        attempts,
                    });
                }
                _ = retry.tick() => {
                    attempts += 1;
                    match self.gateway.connect(&self.config.connection_name).await {
                        Ok(()) => {
                            self.transition(ConnectionState::Connected);
                            info!(
                                event = events::LIFECYCLE_CONNECT_OK,
                                component = COMPONENT,
                                attempts,
                                "connected to provider"
                            );
                            return Ok(attempts);
                        }
                        Err(err) if attempts % PROGRESS_LOG_EVERY == 0 => info!(
                            event = events::LIFECYCLE_CONNECT_PROGRESS,
                            component = COMPONENT,
                            attempts,
                            err = %err,
                            "still trying to connect to provider"
                        ),
                        Err(err) => debug!(
                            event = events::LIFECYCLE_CONNECT_PROGRESS,
                            component = COMPONENT,
                            attempts,
                            err = %err,
                            "connect attempt failed"
                        ),
                    }
                }
            }
        }
    }

    /// Connects, drives the provider's event loop until `shutdown` is cancelled, then
    /// disconnects.
    ///
    /// The provider is disconnected only after its event loop has returned, so no
    /// callback reaches `listener` once disconnect starts.
    pub async fn run(
        &self,
        listener: Arc<dyn ProviderListener>,
        shutdown: CancellationToken,
    ) -> Result<(), LifecycleError> {
        self.connect(&shutdown).await?;

        info!(
            event = events::LIFECYCLE_EVENT_LOOP_START,
            component = COMPONENT,
            request_interval_ms = self.config.request_interval.as_millis() as u64,
            receive_interval_ms = self.config.receive_interval.as_millis() as u64,
            "provider event loop started"
        );
        self.gateway
            .handle_events(
                self.config.request_interval,
                self.config.receive_interval,
                listener,
                shutdown.clone(),
            )
            .await;
        info!(
            event = events::LIFECYCLE_EVENT_LOOP_STOP,
            component = COMPONENT,
            "provider event loop stopped"
        );

        match self.gateway.disconnect().await {
            Ok(()) => info!(
                event = events::LIFECYCLE_DISCONNECT_OK,
                component = COMPONENT,
                "disconnected from provider"
            ),
            Err(err) => warn!(
                event = events::LIFECYCLE_DISCONNECT_FAILED,
                component = COMPONENT,
                err = %err,
                "provider disconnect failed"
            ),
        }
        self.transition(ConnectionState::Disconnected);
        Ok(())
    }
}
