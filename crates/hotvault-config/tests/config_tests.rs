// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Hotvault configuration system.

use std::path::PathBuf;

use hotvault_config::diagnostic::ConfigError;
use hotvault_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use miette::Diagnostic;

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 8443
log_level = "debug"

[storage]
data_dir = "/var/lib/hotvault"

[vault]
passphrase_kdf_iterations = 650000
credential_kdf_iterations = 120000
master_key_file = "/run/secrets/hotvault.key"

[network]
hotspot_keywords = ["ap", "usb"]
probe_address = "192.0.2.1:9"
arp_table_path = "/tmp/arp"
neighbor_command = ["ip", "-4", "neighbor"]
detection_timeout_ms = 500
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8443);
    assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/hotvault"));
    assert_eq!(config.vault.passphrase_kdf_iterations, 650_000);
    assert_eq!(config.vault.credential_kdf_iterations, 120_000);
    assert_eq!(
        config.master_key_path(),
        PathBuf::from("/run/secrets/hotvault.key")
    );
    assert_eq!(config.network.hotspot_keywords, vec!["ap", "usb"]);
    assert_eq!(config.network.neighbor_command, vec!["ip", "-4", "neighbor"]);
    assert_eq!(config.network.detection_timeout_ms, 500);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.server.port, 5001);
    assert_eq!(config.network.detection_timeout_ms, 2000);
    assert_eq!(config.network.arp_table_path, PathBuf::from("/proc/net/arp"));
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = load_config_from_str("[server]\nport = 9000\n").unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn unknown_top_level_section_rejected() {
    assert!(load_config_from_str("[telemetry]\nenabled = true\n").is_err());
}

#[test]
fn typo_gets_suggestion() {
    let errors = load_and_validate_str("[server]\nprot = 1\n").unwrap_err();
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "prot" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("port"));
}

#[test]
fn wrong_type_reports_key() {
    let errors = load_and_validate_str("[server]\nport = \"high\"\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key == "server.port"
    )));
}

#[test]
fn validation_errors_have_diagnostic_codes() {
    let errors =
        load_and_validate_str("[vault]\ncredential_kdf_iterations = 10\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    let code = errors[0].code().map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("hotvault::config::validation"));
    assert!(errors[0].to_string().contains("vault.credential_kdf_iterations"));
}

#[test]
fn unknown_key_in_file_carries_source_span() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("hv.toml", "[network]\nprobe_adress = \"1.1.1.1:1\"\n")?;
        let path = jail.directory().join("hv.toml");
        let errors = load_and_validate_path(&path).unwrap_err();
        match &errors[0] {
            ConfigError::UnknownKey {
                span, suggestion, ..
            } => {
                assert!(span.is_some());
                assert_eq!(suggestion.as_deref(), Some("probe_address"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
fn rendered_error_mentions_valid_keys() {
    let errors = load_and_validate_str("[storage]\ndata_directory = \"/x\"\n").unwrap_err();
    let help = errors[0].help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("data_dir"), "help was: {help}");
}
