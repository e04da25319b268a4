// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-change events broadcast to subscribers.
//!
//! One event describes either a host status transition or an app liveness
//! sample, never both. On the wire each event is a single JSON object with
//! unused fields at their zero value:
//!
//! ```json
//! {"server_id":42,"app_id":0,"server_status":"disconnected","app_status":false}
//! ```

use serde::{Deserialize, Serialize};

use crate::id::{AppId, HostId};
use crate::status::ConnectStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub server_id: u64,
    pub app_id: u64,
    #[serde(with = "status_field")]
    pub server_status: Option<ConnectStatus>,
    pub app_status: bool,
}

impl StatusEvent {
    /// A host status transition.
    pub fn host(id: HostId, status: ConnectStatus) -> Self {
        Self { server_id: id.0, app_id: 0, server_status: Some(status), app_status: false }
    }

    /// An app liveness sample.
    pub fn app(id: AppId, up: bool) -> Self {
        Self { server_id: 0, app_id: id.0, server_status: None, app_status: up }
    }
}

/// `server_status` is a bare string on the wire, `""` when absent.
mod status_field {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::status::ConnectStatus;

    pub fn serialize<S: Serializer>(
        value: &Option<ConnectStatus>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(status) => status.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ConnectStatus>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(None);
        }
        text.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
