// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App watchdog scenarios: restart flow, unresolved hosts, HTTP probes.

use ov_core::test_support::{app_config, host_config};
use ov_core::{AppId, AppState, CheckKind, StatusEvent};

use crate::fixture::{rig, tick};

#[tokio::test(start_paused = true)]
async fn crashed_app_is_restarted_and_both_transitions_are_published() {
    let mut rig = rig(8).await;
    rig.pool.register(host_config(42)).await.unwrap();
    rig.events();

    // The probe finds no process; the start script succeeds.
    rig.transport.respond("/usr/bin/mystart", "");
    // {id: 7, host: 42, process-name "myd", 1s interval, auto_restart}
    rig.manager.create(app_config(7, 42)).unwrap();

    tick(1).await;
    tick(1).await;

    let events = rig.events();
    let down = events.iter().position(|e| *e == StatusEvent::app(AppId(7), false));
    let up = events.iter().position(|e| *e == StatusEvent::app(AppId(7), true));
    match (down, up) {
        (Some(down), Some(up)) => assert!(down < up, "down must precede up"),
        other => panic!("missing transition events: {other:?} in {events:?}"),
    }

    // The restart invoked the start script verbatim.
    assert!(rig.transport.executed().contains(&"/usr/bin/mystart".to_string()));
    assert_eq!(rig.manager.get(AppId(7)).unwrap().last_result, AppState::Up);

    rig.shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn app_bound_to_an_unregistered_host_reports_down_until_removed() {
    let mut rig = rig(8).await;
    rig.manager.create(app_config(8, 999)).unwrap();

    tick(1).await;
    assert_eq!(rig.events(), vec![StatusEvent::app(AppId(8), false)]);
    tick(1).await;
    assert_eq!(rig.events(), vec![StatusEvent::app(AppId(8), false)]);

    rig.manager.remove(AppId(8));
    tick(1).await;
    assert!(rig.events().is_empty());

    rig.shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn http_app_follows_the_status_code() {
    let mut rig = rig(8).await;
    rig.pool.register(host_config(42)).await.unwrap();
    rig.events();

    rig.transport.respond("curl", "200");
    let mut app = app_config(9, 42);
    app.check = CheckKind::Http;
    app.target = "http://example.test".to_string();
    app.auto_restart = false;
    rig.manager.create(app).unwrap();

    tick(1).await;
    assert_eq!(rig.events(), vec![StatusEvent::app(AppId(9), true)]);
    assert_eq!(rig.manager.get(AppId(9)).unwrap().last_result, AppState::Up);

    // The service starts failing: one down event per interval, and with
    // auto_restart off it stays down.
    rig.transport.clear_responses();
    rig.transport.respond("curl", "503");

    tick(1).await;
    assert_eq!(rig.events(), vec![StatusEvent::app(AppId(9), false)]);
    tick(1).await;
    assert_eq!(rig.events(), vec![StatusEvent::app(AppId(9), false)]);
    assert_eq!(rig.manager.get(AppId(9)).unwrap().last_result, AppState::Down);

    rig.shutdown.cancel();
}
