// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ov_core::test_support::host_config;

#[tokio::test]
async fn scripted_responses_match_by_substring() {
    let transport = FakeTransport::new();
    transport.respond("ps -ef", "12345\n");
    let session = transport.open(&host_config(2)).await.unwrap();

    let out = session.execute("ps -ef | grep myd", Duration::from_secs(1)).await.unwrap();
    assert_eq!(out, "12345\n");

    let out = session.execute("unmatched", Duration::from_secs(1)).await.unwrap();
    assert_eq!(out, "");

    assert_eq!(transport.executed().len(), 2);
}

#[tokio::test]
async fn refused_dials_do_not_open_sessions() {
    let transport = FakeTransport::new();
    transport.refuse_dials();
    assert!(transport.open(&host_config(2)).await.is_err());
    assert_eq!(transport.dial_count(), 1);
    assert_eq!(transport.opened_count(), 0);

    transport.accept_dials();
    assert!(transport.open(&host_config(2)).await.is_ok());
    assert_eq!(transport.opened_count(), 1);
}

#[tokio::test]
async fn cut_link_kills_existing_sessions() {
    let transport = FakeTransport::new();
    let session = transport.open(&host_config(2)).await.unwrap();
    assert!(session.keepalive().await.is_ok());

    transport.cut_link();
    assert!(session.keepalive().await.is_err());
    assert!(session.execute("echo hi", Duration::from_secs(1)).await.is_err());

    transport.restore_link();
    assert!(session.keepalive().await.is_ok());
}

#[tokio::test]
async fn close_is_counted() {
    let transport = FakeTransport::new();
    let session = transport.open(&host_config(2)).await.unwrap();
    session.close().await;
    assert_eq!(transport.closed_count(), 1);
}
