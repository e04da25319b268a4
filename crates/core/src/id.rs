// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numeric identifiers for hosts and supervised apps.

use serde::{Deserialize, Serialize};

/// Identifier of a host the supervisor can execute commands on.
///
/// Id `1` is reserved for the local pseudo-host; the pool rejects
/// registering it as a remote.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HostId(pub u64);

impl HostId {
    /// The local pseudo-host. Its commands run as child processes of the
    /// supervisor itself and it is permanently connected.
    pub const LOCAL: HostId = HostId(1);

    pub fn is_local(self) -> bool {
        self == Self::LOCAL
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for HostId {
    fn from(id: u64) -> Self {
        HostId(id)
    }
}

/// Identifier of a supervised application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppId(pub u64);

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for AppId {
    fn from(id: u64) -> Self {
        AppId(id)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
