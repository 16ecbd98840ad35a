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

use crate::websocket_transport::WebSocketTransport;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use simvar_streamer::SimVarStreamer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) streamer: Arc<SimVarStreamer>,
    pub(crate) transport: Arc<WebSocketTransport>,
    /// Closes every open socket when cancelled.
    pub(crate) transport_shutdown: CancellationToken,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/debug", get(debug_handler))
        .route("/simvars", get(simvars_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// Generated documents are never cached and readable from any origin.
fn plain_text(body: String) -> impl IntoResponse {
    (
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        body,
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let transport = state.transport.clone();
    let shutdown = state.transport_shutdown.clone();
    ws.on_upgrade(move |socket| transport.serve_socket(socket, shutdown))
}

async fn debug_handler(State(state): State<AppState>) -> impl IntoResponse {
    plain_text(state.streamer.diagnostics().await.render_debug())
}

async fn simvars_handler(State(state): State<AppState>) -> impl IntoResponse {
    plain_text(state.streamer.diagnostics().await.render_simvars())
}

async fn health_handler() -> &'static str {
    "OK"
}
