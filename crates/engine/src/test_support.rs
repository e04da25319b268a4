// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test subscriber sink shared with other crates' tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ov_core::StatusEvent;
use tokio::sync::mpsc;

use crate::bus::{EventSink, SinkError};

/// Unbounded channel sink; tests drain frames from the receiver half.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
    closed: AtomicBool,
}

impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, closed: AtomicBool::new(false) }), rx)
    }

    /// Whether the bus closed this sink (detach or replacement).
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&self, frame: &str) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        self.tx.send(frame.to_string()).map_err(|_| SinkError::Closed)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Drain every frame currently buffered in `rx` as parsed events.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let Ok(event) = serde_json::from_str(&frame) {
            events.push(event);
        }
    }
    events
}
