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

mod config;
mod events;
mod http;
mod simulated_gateway;
mod websocket_transport;

use crate::config::{BridgeArgs, Config};
use crate::http::AppState;
use crate::simulated_gateway::SimulatedGateway;
use crate::websocket_transport::WebSocketTransport;
use clap::Parser;
use simvar_streamer::{LifecycleError, SimVarStreamer};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Inbound frames from all sockets funnel through one control loop.
const TRANSPORT_EVENT_QUEUE_SIZE: usize = 1024;

#[derive(Debug)]
enum BridgeError {
    Bind {
        address: String,
        source: std::io::Error,
    },
    Serve(std::io::Error),
    Lifecycle(LifecycleError),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Bind { address, source } => {
                write!(f, "Unable to bind {address}: {source}")
            }
            BridgeError::Serve(source) => write!(f, "HTTP server failed: {source}"),
            BridgeError::Lifecycle(source) => write!(f, "{source}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BridgeError::Bind { source, .. } | BridgeError::Serve(source) => Some(source),
            BridgeError::Lifecycle(source) => Some(source),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = BridgeArgs::parse();
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!(event = events::BRIDGE_START, "Started simvar-bridge");

    match run(config).await {
        Ok(()) => {
            info!(event = events::BRIDGE_STOP, "simvar-bridge stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(
                event = events::BRIDGE_STOP_FAILED,
                err = %err,
                "simvar-bridge stopped with an error"
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), BridgeError> {
    let (event_sender, event_receiver) = mpsc::channel(TRANSPORT_EVENT_QUEUE_SIZE);
    let transport = WebSocketTransport::new(config.server_config.client_queue_size, event_sender);
    let gateway = Arc::new(SimulatedGateway::new(&config.simulator_config));
    let streamer = SimVarStreamer::new(gateway, transport.clone(), config.lifecycle_config());
    let transport_shutdown = CancellationToken::new();

    let address = config.server_config.address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| BridgeError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(
        event = events::BRIDGE_LISTEN,
        address = %address,
        connection_name = streamer.name(),
        "listening for WebSocket clients"
    );

    let app = http::router(AppState {
        streamer: streamer.clone(),
        transport,
        transport_shutdown: transport_shutdown.clone(),
    });
    let server = tokio::spawn({
        let transport_shutdown = transport_shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(transport_shutdown.cancelled_owned())
                .await
        }
    });

    let control_loop = tokio::spawn({
        let streamer = streamer.clone();
        async move { streamer.run_transport_events(event_receiver).await }
    });

    let signal_token = streamer.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!(
            event = events::BRIDGE_SIGNAL_RECEIVED,
            "Shutdown signal received, stopping simvar-bridge"
        );
        signal_token.cancel();
    });

    // Provider side goes first: the event loop stops and the provider is disconnected
    // before any client socket is closed.
    let outcome = streamer.clone().run().await;
    streamer.shutdown_token().cancel();
    transport_shutdown.cancel();

    if let Err(err) = control_loop.await {
        warn!(event = events::BRIDGE_TASK_FAILED, err = %err, "control loop task failed");
    }
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(BridgeError::Serve(err)),
        Err(err) => warn!(
            event = events::BRIDGE_TASK_FAILED,
            err = %err,
            "HTTP server task failed"
        ),
    }

    shutdown_outcome(outcome)
}

/// A shutdown requested before the provider connected is a clean stop.
fn shutdown_outcome(outcome: Result<(), LifecycleError>) -> Result<(), BridgeError> {
    match outcome {
        Ok(()) | Err(LifecycleError::Cancelled) => Ok(()),
        Err(err) => Err(BridgeError::Lifecycle(err)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(
                event = events::BRIDGE_SIGNAL_UNAVAILABLE,
                err = %err,
                "unable to listen for Ctrl+C"
            );
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(
                    event = events::BRIDGE_SIGNAL_UNAVAILABLE,
                    err = %err,
                    "unable to listen for SIGTERM"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
