// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::protocol::{read_response, write_request};
use ov_adapters::FakeTransport;
use ov_core::test_support::{app_config, host_config};
use ov_core::{AppId, HostId, SystemClock};
use ov_engine::PoolConfig;
use std::time::Duration;

fn ctx(transport: &FakeTransport) -> Arc<ListenCtx> {
    let bus = EventBus::new(Duration::from_secs(5));
    let pool_config = PoolConfig {
        capacity: 4,
        probe_interval: Duration::from_secs(3600),
        dial_timeout: Duration::from_secs(1),
        command_timeout: Duration::from_secs(1),
    };
    let pool = Arc::new(ConnectionPool::new(
        Arc::new(transport.clone()),
        bus.clone(),
        pool_config,
        SystemClock,
    ));
    let manager = Arc::new(CheckerManager::new(
        Arc::clone(&pool),
        bus.clone(),
        SystemClock,
        CancellationToken::new(),
    ));
    Arc::new(ListenCtx {
        pool,
        manager,
        bus,
        start_time: Instant::now(),
        shutdown: CancellationToken::new(),
    })
}

#[tokio::test]
async fn host_requests_drive_the_pool() {
    let transport = FakeTransport::new();
    let ctx = ctx(&transport);

    let response =
        dispatch(Request::HostRegister { host: host_config(2) }, &ctx).await;
    assert_eq!(response, Response::Ok);

    match dispatch(Request::HostList, &ctx).await {
        Response::Hosts { hosts } => {
            let ids: Vec<u64> = hosts.iter().map(|h| h.id.0).collect();
            assert_eq!(ids, vec![1, 2]);
        }
        other => panic!("expected Hosts, got {other:?}"),
    }

    match dispatch(Request::HostGet { id: HostId(999) }, &ctx).await {
        Response::Error { code, .. } => assert_eq!(code, 10005),
        other => panic!("expected Error, got {other:?}"),
    }

    assert_eq!(dispatch(Request::HostRemove { id: HostId(2) }, &ctx).await, Response::Ok);
    match dispatch(Request::HostList, &ctx).await {
        Response::Hosts { hosts } => assert_eq!(hosts.len(), 1),
        other => panic!("expected Hosts, got {other:?}"),
    }
}

#[tokio::test]
async fn exec_requests_return_captured_stdout() {
    let transport = FakeTransport::new();
    transport.respond("uptime", "up 3 days\n");
    let ctx = ctx(&transport);
    dispatch(Request::HostRegister { host: host_config(2) }, &ctx).await;

    let response =
        dispatch(Request::HostExec { id: HostId(2), command: "uptime".to_string() }, &ctx).await;
    assert_eq!(response, Response::Output { stdout: "up 3 days\n".to_string() });
}

#[tokio::test]
async fn app_requests_drive_the_manager() {
    let transport = FakeTransport::new();
    let ctx = ctx(&transport);

    assert_eq!(dispatch(Request::AppCreate { app: app_config(7, 42) }, &ctx).await, Response::Ok);

    match dispatch(Request::AppCreate { app: app_config(7, 42) }, &ctx).await {
        Response::Error { code, .. } => assert_eq!(code, 10001),
        other => panic!("expected Error, got {other:?}"),
    }

    match dispatch(Request::AppGet { id: AppId(7) }, &ctx).await {
        Response::App { app } => assert_eq!(app.name, "app-7"),
        other => panic!("expected App, got {other:?}"),
    }

    assert_eq!(dispatch(Request::AppRemove { id: AppId(7) }, &ctx).await, Response::Ok);
    match dispatch(Request::AppList, &ctx).await {
        Response::Apps { apps } => assert!(apps.is_empty()),
        other => panic!("expected Apps, got {other:?}"),
    }
}

#[tokio::test]
async fn status_reports_counts() {
    let transport = FakeTransport::new();
    let ctx = ctx(&transport);
    dispatch(Request::HostRegister { host: host_config(2) }, &ctx).await;
    dispatch(Request::AppCreate { app: app_config(7, 2) }, &ctx).await;

    match dispatch(Request::Status, &ctx).await {
        Response::Status { hosts, apps, subscribers, .. } => {
            assert_eq!(hosts, 1);
            assert_eq!(apps, 1);
            assert_eq!(subscribers, 0);
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn socket_round_trip_and_shutdown() {
    let transport = FakeTransport::new();
    let ctx = ctx(&transport);
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("overseerd.sock");
    let socket = UnixListener::bind(&socket_path).unwrap();
    tokio::spawn(Listener::new(socket, Arc::clone(&ctx)).run());

    let stream = UnixStream::connect(&socket_path).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();

    write_request(&mut writer, &Request::Ping).await.unwrap();
    assert_eq!(read_response(&mut reader).await.unwrap(), Response::Ok);

    write_request(&mut writer, &Request::Hello { version: "test".to_string() }).await.unwrap();
    match read_response(&mut reader).await.unwrap() {
        Response::Hello { version } => assert_eq!(version, env::DAEMON_VERSION),
        other => panic!("expected Hello, got {other:?}"),
    }

    write_request(&mut writer, &Request::Shutdown).await.unwrap();
    assert_eq!(read_response(&mut reader).await.unwrap(), Response::Ok);
    assert!(ctx.shutdown.is_cancelled());
}
