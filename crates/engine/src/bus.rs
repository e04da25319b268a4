// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out to attached subscribers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ov_core::StatusEvent;
use smol_str::SmolStr;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Write half of a subscriber's duplex channel.
///
/// Implementations serialize their own writes; the per-channel write
/// lock lives behind this trait.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, frame: &str) -> Result<(), SinkError>;

    /// Best-effort close notification to the peer. Idempotent.
    async fn close(&self);
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("subscriber channel closed")]
    Closed,

    #[error("write failed: {0}")]
    Io(String),
}

/// Session-keyed registry of subscribers.
///
/// `publish` holds the registry lock across all writes. Subscribers are
/// one per signed-in operator, so contention at this scale is not a
/// concern; were that to change, per-subscriber queues drained by writer
/// tasks would replace the broadcast loop.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    subscribers: Mutex<HashMap<SmolStr, Arc<dyn EventSink>>>,
    write_timeout: Duration,
}

impl EventBus {
    pub fn new(write_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(BusInner { subscribers: Mutex::new(HashMap::new()), write_timeout }),
        }
    }

    /// Attach a subscriber under `key`.
    ///
    /// An existing entry under the same key is closed and replaced;
    /// keeping the old channel would strand the new client behind a dead
    /// registration.
    pub async fn attach(&self, key: &str, sink: Arc<dyn EventSink>) {
        let old = self.inner.subscribers.lock().await.insert(SmolStr::new(key), sink);
        if let Some(old) = old {
            debug!(key, "closing replaced subscriber");
            old.close().await;
        }
        debug!(key, "subscriber attached");
    }

    /// Detach and close the subscriber under `key`. Idempotent.
    pub async fn detach(&self, key: &str) {
        let removed = self.inner.subscribers.lock().await.remove(key);
        if let Some(sink) = removed {
            sink.close().await;
            debug!(key, "subscriber detached");
        }
    }

    /// Broadcast one event to every subscriber.
    ///
    /// Write failures and timeouts are logged and the subscriber is
    /// kept; its own read loop is expected to notice the dead peer and
    /// detach.
    pub async fn publish(&self, event: &StatusEvent) {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "dropping unserializable event");
                return;
            }
        };

        let subscribers = self.inner.subscribers.lock().await;
        for (key, sink) in subscribers.iter() {
            match tokio::time::timeout(self.inner.write_timeout, sink.send(&frame)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(key = %key, error = %e, "event write failed"),
                Err(_) => warn!(key = %key, "event write timed out"),
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().await.len()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
