// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use std::net::SocketAddr;

use crate::diagnostic::ConfigError;
use crate::model::HotvaultConfig;

/// Lowest PBKDF2 iteration count accepted for any key derivation.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Upper bound for `network.detection_timeout_ms`.
pub const MAX_DETECTION_TIMEOUT_MS: u64 = 10_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration. Collects every problem instead of
/// stopping at the first.
pub fn validate_config(config: &HotvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::validation("server.host", "must not be empty"));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(
            "server.log_level",
            format!(
                "`{}` is not one of {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.storage.data_dir.as_os_str().is_empty() {
        errors.push(ConfigError::validation("storage.data_dir", "must not be empty"));
    }

    for (field, value) in [
        (
            "vault.passphrase_kdf_iterations",
            config.vault.passphrase_kdf_iterations,
        ),
        (
            "vault.credential_kdf_iterations",
            config.vault.credential_kdf_iterations,
        ),
    ] {
        if value < MIN_KDF_ITERATIONS {
            errors.push(ConfigError::validation(
                field,
                format!("must be at least {MIN_KDF_ITERATIONS}, got {value}"),
            ));
        }
    }

    if config.network.probe_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigError::validation(
            "network.probe_address",
            format!(
                "`{}` is not an `ip:port` socket address",
                config.network.probe_address
            ),
        ));
    }

    let timeout = config.network.detection_timeout_ms;
    if !(1..=MAX_DETECTION_TIMEOUT_MS).contains(&timeout) {
        errors.push(ConfigError::validation(
            "network.detection_timeout_ms",
            format!("must be between 1 and {MAX_DETECTION_TIMEOUT_MS}, got {timeout}"),
        ));
    }

    if config
        .network
        .neighbor_command
        .first()
        .is_none_or(|program| program.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "network.neighbor_command",
            "must name a program",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
