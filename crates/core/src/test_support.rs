// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config builders shared across crates' tests.

use crate::app::AppConfig;
use crate::host::{Credential, HostConfig};
use crate::id::{AppId, HostId};
use crate::status::CheckKind;

/// A password-authenticated remote host config with test defaults.
pub fn host_config(id: u64) -> HostConfig {
    HostConfig {
        id: HostId(id),
        addr: "10.0.0.5".to_string(),
        port: 22,
        user: "ops".to_string(),
        credential: Credential::Password { secret: "x".to_string() },
    }
}

/// A process-name app config with test defaults: 1s interval,
/// auto-restart on.
pub fn app_config(id: u64, host: u64) -> AppConfig {
    AppConfig {
        id: AppId(id),
        name: format!("app-{id}"),
        host: HostId(host),
        check: CheckKind::Process,
        target: "myd".to_string(),
        interval_secs: 1,
        start_script: "/usr/bin/mystart".to_string(),
        auto_restart: true,
    }
}
