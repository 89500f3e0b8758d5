// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading tests for pim-client.

use std::io::Write;

use pim_client::{CONFIGURATION_PATH_ENVIRONMENT_VARIABLE, Configuration, PimError};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn load(content: &str) -> pim_client::Result<Configuration> {
    let file = write_config(content);
    Configuration::from_file(file.path())
}

fn reason(err: PimError) -> String {
    match err {
        PimError::InvalidConfiguration { reason, .. } => reason,
        other => panic!("expected an invalid configuration, got {other:?}"),
    }
}

#[test]
fn test_plain_configuration() {
    let config =
        load(r#"{"version":1,"pim":{"uri":"dns:host:80","headers":{"k":"v"},"tls":false}}"#)
            .unwrap();

    assert_eq!(config.uri(), "dns:host:80");
    assert_eq!(config.headers(), [("k".to_string(), "v".to_string())]);
    assert!(!config.tls());
    assert_eq!(config.access_token(), None);
    assert_eq!(
        config,
        Configuration::new(
            "dns:host:80",
            vec![("k".to_string(), "v".to_string())],
            false,
            None
        )
        .unwrap()
    );
}

#[test]
fn test_plain_configuration_keeps_authorization_header() {
    let config = load(
        r#"{"version":1,"pim":{"uri":"dns:host:80","headers":{"authorization":"Bearer 007"},"tls":false}}"#,
    )
    .unwrap();

    assert_eq!(config.access_token(), None);
    assert_eq!(config.headers().len(), 1);
}

#[test]
fn test_headers_keep_file_order() {
    let config = load(
        r#"{"version":1,"pim":{"uri":"dns:host:80","headers":{"z":"1","a":"2","m":"3"},"tls":false}}"#,
    )
    .unwrap();

    let keys: Vec<&str> = config.headers().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_secure_configuration_extracts_bearer_token() {
    let config = load(
        r#"{
            "version": 1,
            "pim": {
                "uri": "dns:pim.example.com:443",
                "headers": {
                    "first": "1",
                    "Authorization": "Bearer 007",
                    "last": "2"
                },
                "tls": true
            }
        }"#,
    )
    .unwrap();

    assert!(config.tls());
    assert_eq!(config.access_token(), Some("007"));
    assert_eq!(
        config.headers(),
        [
            ("first".to_string(), "1".to_string()),
            ("last".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn test_secure_configuration_requires_bearer_token() {
    let cases = [
        r#"{"version":1,"pim":{"uri":"dns:h:443","headers":{},"tls":true}}"#,
        r#"{"version":1,"pim":{"uri":"dns:h:443","headers":{"authorization":"Basic abc"},"tls":true}}"#,
        r#"{"version":1,"pim":{"uri":"dns:h:443","headers":{"x-authorization":"Bearer 007"},"tls":true}}"#,
    ];

    for case in cases {
        let reason = reason(load(case).unwrap_err());
        assert!(
            reason.contains("An authorization header with a bearer token is required"),
            "{reason}"
        );
    }
}

#[test]
fn test_invalid_json() {
    let reason = reason(load("{ not json").unwrap_err());
    assert!(reason.contains("json"));
}

#[test]
fn test_unsupported_version() {
    let reason = reason(
        load(r#"{"version":2,"pim":{"uri":"dns:h:80","headers":{},"tls":false}}"#).unwrap_err(),
    );
    assert!(reason.contains("version"));
    assert!(reason.contains("\"2\""));
}

#[test]
fn test_version_compares_by_value() {
    let config = Configuration::parse(
        "c.json",
        r#"{"version":1.0,"pim":{"uri":"dns:h:80","headers":{},"tls":false}}"#,
    )
    .unwrap();
    assert_eq!(config.uri(), "dns:h:80");

    let err = Configuration::parse(
        "c.json",
        r#"{"version":"1","pim":{"uri":"dns:h:80","headers":{},"tls":false}}"#,
    )
    .unwrap_err();
    assert!(reason(err).contains("Unsupported version \"1\""));
}

#[test]
fn test_missing_entries() {
    let cases = [
        (r#"{"pim":{"uri":"dns:h:80","headers":{},"tls":false}}"#, "version"),
        (r#"{"version":1}"#, "pim"),
        (r#"{"version":1,"pim":{"headers":{},"tls":false}}"#, "uri"),
        (r#"{"version":1,"pim":{"uri":"dns:h:80","tls":false}}"#, "headers"),
        (r#"{"version":1,"pim":{"uri":"dns:h:80","headers":{}}}"#, "tls"),
    ];

    for (content, key) in cases {
        let reason = reason(load(content).unwrap_err());
        assert_eq!(
            reason,
            format!("The configuration is missing the entry {key}.")
        );
    }
}

#[test]
fn test_error_names_the_file() {
    let file = write_config("[");
    let err = Configuration::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains(&file.path().display().to_string()));
    assert!(err.to_string().contains("is invalid"));
}

#[test]
fn test_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let err = Configuration::from_file(&path).unwrap_err();
    match err {
        PimError::InvalidConfiguration { path: p, reason } => {
            assert_eq!(p, path.display().to_string());
            assert!(reason.contains("cannot be read"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_not_configured() {
    let err = Configuration::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, PimError::NotConfigured));
    assert!(err.to_string().contains(CONFIGURATION_PATH_ENVIRONMENT_VARIABLE));
}

#[test]
fn test_environment_bootstrap_expands_variables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pim.json"),
        r#"{"version":1,"pim":{"uri":"dns:host:80","headers":{},"tls":false}}"#,
    )
    .unwrap();
    let dir_path = dir.path().display().to_string();

    let config = Configuration::from_lookup(|name| match name {
        CONFIGURATION_PATH_ENVIRONMENT_VARIABLE => Some("${PIM_DIR}/pim.json".to_string()),
        "PIM_DIR" => Some(dir_path.clone()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.uri(), "dns:host:80");
}

#[test]
fn test_environment_bootstrap_reports_invalid_file() {
    let file = write_config(r#"{"version":1}"#);
    let path = file.path().display().to_string();

    let err = Configuration::from_lookup(|name| {
        (name == CONFIGURATION_PATH_ENVIRONMENT_VARIABLE).then(|| path.clone())
    })
    .unwrap_err();

    assert!(reason(err).contains("pim"));
}
