// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket subscriber endpoint — the event bus's duplex channel.
//!
//! After the handshake the client's first text frame names its
//! subscriber key, then the connection is attached to the bus. A
//! per-connection heartbeat task pings on a fixed cadence; any read
//! error, oversized frame, or a full read deadline of silence tears the
//! subscription down and detaches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use ov_engine::{EventBus, EventSink, SinkError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Inbound frames above this size terminate the subscription.
pub const MAX_FRAME_BYTES: usize = 512;

/// Subscriber keys are short operator identifiers.
const MAX_KEY_BYTES: usize = 128;

#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Ping cadence per connection.
    pub heartbeat: Duration,
    /// Silence budget; refreshed by any inbound frame.
    pub read_deadline: Duration,
}

/// Accept loop for subscriber connections.
pub struct WsServer {
    listener: TcpListener,
    bus: EventBus,
    config: WsConfig,
    shutdown: CancellationToken,
}

impl WsServer {
    pub fn new(
        listener: TcpListener,
        bus: EventBus,
        config: WsConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self { listener, bus, config, shutdown }
    }

    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "subscriber connection");
                        let bus = self.bus.clone();
                        let config = self.config.clone();
                        let shutdown = self.shutdown.child_token();
                        tokio::spawn(async move {
                            if let Err(e) = handle_subscriber(stream, bus, config, shutdown).await {
                                debug!(error = %e, "subscriber connection ended");
                            }
                        });
                    }
                    Err(e) => warn!("ws accept error: {e}"),
                },
            }
        }
        debug!("ws server stopped");
    }
}

/// Write half of one subscriber connection. The mutex is the
/// per-channel write lock: broadcasts, pings, and the close frame all
/// serialize through it.
struct WsSink {
    write: Mutex<SplitSink<WebSocketStream<TcpStream>, Message>>,
}

impl WsSink {
    async fn ping(&self) -> Result<(), SinkError> {
        self.write
            .lock()
            .await
            .send(Message::Ping(Vec::new().into()))
            .await
            .map_err(|e| SinkError::Io(e.to_string()))
    }
}

#[async_trait]
impl EventSink for WsSink {
    async fn send(&self, frame: &str) -> Result<(), SinkError> {
        self.write
            .lock()
            .await
            .send(Message::text(frame))
            .await
            .map_err(|e| SinkError::Io(e.to_string()))
    }

    async fn close(&self) {
        let _ = self.write.lock().await.send(Message::Close(None)).await;
    }
}

async fn handle_subscriber(
    stream: TcpStream,
    bus: EventBus,
    config: WsConfig,
    shutdown: CancellationToken,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (write, mut read) = ws.split();

    // First frame identifies the subscriber.
    let key = match tokio::time::timeout(config.read_deadline, read.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => {
            let key = text.as_str().trim().to_string();
            if key.is_empty() || key.len() > MAX_KEY_BYTES {
                warn!("rejecting invalid subscriber key");
                return Ok(());
            }
            key
        }
        _ => {
            debug!("subscriber never identified itself");
            return Ok(());
        }
    };

    let sink = Arc::new(WsSink { write: Mutex::new(write) });
    bus.attach(&key, Arc::clone(&sink) as Arc<dyn EventSink>).await;
    info!(key = %key, "subscriber attached");

    let heartbeat_token = shutdown.child_token();
    let heartbeat = spawn_heartbeat(Arc::clone(&sink), config.heartbeat, heartbeat_token.clone());

    // Read loop. Pongs (and any other inbound frame) refresh the
    // deadline; the peer is expected to answer pings well inside it.
    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = tokio::time::timeout(config.read_deadline, read.next()) => frame,
        };
        match frame {
            Ok(Some(Ok(message))) => {
                if message.len() > MAX_FRAME_BYTES {
                    warn!(key = %key, bytes = message.len(), "oversized frame");
                    break;
                }
                match message {
                    Message::Close(_) => break,
                    Message::Pong(_) => debug!(key = %key, "heartbeat pong"),
                    _ => {}
                }
            }
            Ok(Some(Err(e))) => {
                debug!(key = %key, error = %e, "read failed");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                warn!(key = %key, "read deadline expired");
                break;
            }
        }
    }

    heartbeat_token.cancel();
    let _ = heartbeat.await;
    bus.detach(&key).await;
    info!(key = %key, "subscriber detached");
    Ok(())
}

fn spawn_heartbeat(
    sink: Arc<WsSink>,
    interval: Duration,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The connection just opened; first ping after one interval.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if sink.ping().await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
