// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::app_config;

#[test]
fn one_second_interval_is_accepted() {
    let mut config = app_config(7, 42);
    config.interval_secs = 1;
    assert!(config.validate().is_ok());
    assert_eq!(config.interval(), Duration::from_secs(1));
}

#[test]
fn zero_interval_is_rejected() {
    let mut config = app_config(7, 42);
    config.interval_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, OpsError::InvalidConfig(_)));
}

#[test]
fn empty_target_is_rejected() {
    let mut config = app_config(7, 42);
    config.target = String::new();
    assert!(matches!(config.validate(), Err(OpsError::InvalidConfig(_))));
}

#[test]
fn app_config_serde_round_trips() {
    let config = app_config(7, 42);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""check":"process-name""#));
    let back: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
