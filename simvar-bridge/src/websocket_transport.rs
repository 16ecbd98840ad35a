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

//! WebSocket implementation of [`ClientTransport`].
//!
//! Every socket gets its own bounded outbound queue drained by a writer task, so a slow
//! client only ever loses its own payloads.

use crate::events;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use simvar_streamer::{ClientId, ClientTransport, TransportEvent};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "websocket_transport";

pub struct WebSocketTransport {
    clients: RwLock<HashMap<ClientId, mpsc::Sender<Arc<str>>>>,
    events: mpsc::Sender<TransportEvent>,
    queue_size: usize,
}

impl WebSocketTransport {
    pub fn new(queue_size: usize, events: mpsc::Sender<TransportEvent>) -> Arc<Self> {
        Arc::new(Self {
            clients: RwLock::new(HashMap::new()),
            events,
            queue_size: queue_size.max(1),
        })
    }

    fn read_clients(&self) -> RwLockReadGuard<'_, HashMap<ClientId, mpsc::Sender<Arc<str>>>> {
        self.clients.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_clients(&self) -> RwLockWriteGuard<'_, HashMap<ClientId, mpsc::Sender<Arc<str>>>> {
        self.clients.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a client and announces it to the control plane. The returned receiver is the
    /// client's outbound queue.
    pub(crate) async fn attach(&self) -> (ClientId, mpsc::Receiver<Arc<str>>) {
        let client_id = ClientId::new(Uuid::new_v4().to_string());
        let (sender, receiver) = mpsc::channel(self.queue_size);
        self.write_clients().insert(client_id.clone(), sender);
        info!(
            event = events::WS_CLIENT_CONNECTED,
            component = COMPONENT,
            client_id = %client_id,
            "client connected"
        );
        self.emit(TransportEvent::ClientConnected(client_id.clone()))
            .await;
        (client_id, receiver)
    }

    pub(crate) async fn detach(&self, client_id: &ClientId) {
        if self.write_clients().remove(client_id).is_none() {
            return;
        }
        info!(
            event = events::WS_CLIENT_DISCONNECTED,
            component = COMPONENT,
            client_id = %client_id,
            "client disconnected"
        );
        self.emit(TransportEvent::ClientDisconnected(client_id.clone()))
            .await;
    }

    pub(crate) async fn receive(&self, client_id: &ClientId, body: Vec<u8>) {
        self.emit(TransportEvent::ClientMessage(client_id.clone(), body))
            .await;
    }

    async fn emit(&self, event: TransportEvent) {
        if self.events.send(event).await.is_err() {
            debug!(
                event = events::WS_EVENT_DROPPED,
                component = COMPONENT,
                "control loop gone, dropping event"
            );
        }
    }

    /// Runs one upgraded socket until the peer closes or `shutdown` fires.
    pub async fn serve_socket(self: Arc<Self>, socket: WebSocket, shutdown: CancellationToken) {
        let (client_id, mut outbound) = self.attach().await;
        let (mut sink, mut stream) = socket.split();

        let writer_shutdown = shutdown.clone();
        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = writer_shutdown.cancelled() => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    payload = outbound.recv() => {
                        let Some(payload) = payload else { break };
                        if sink.send(Message::Text(payload.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.receive(&client_id, text.as_str().as_bytes().to_vec()).await;
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            self.receive(&client_id, bytes.to_vec()).await;
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            debug!(
                                event = events::WS_READ_FAILED,
                                component = COMPONENT,
                                client_id = %client_id,
                                err = %err,
                                "socket read failed"
                            );
                            break;
                        }
                    }
                }
            }
        }

        self.detach(&client_id).await;
        let _ = writer.await;
    }
}

impl ClientTransport for WebSocketTransport {
    fn send_to(&self, client_id: &ClientId, payload: Arc<str>) {
        let clients = self.read_clients();
        let Some(sender) = clients.get(client_id) else {
            return;
        };
        match sender.try_send(payload) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(
                    event = events::WS_QUEUE_FULL,
                    component = COMPONENT,
                    client_id = %client_id,
                    "client queue full, dropping payload"
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    fn broadcast(&self, payload: Arc<str>) {
        let clients = self.read_clients();
        for (client_id, sender) in clients.iter() {
            if let Err(TrySendError::Full(_)) = sender.try_send(payload.clone()) {
                warn!(
                    event = events::WS_QUEUE_FULL,
                    component = COMPONENT,
                    client_id = %client_id,
                    "client queue full, dropping broadcast"
                );
            }
        }
    }

    fn connected_clients(&self) -> Vec<ClientId> {
        let mut clients: Vec<ClientId> = self.read_clients().keys().cloned().collect();
        clients.sort();
        clients
    }
}
