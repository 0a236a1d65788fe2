// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/hotvault/hotvault.toml`,
//! `~/.config/hotvault/hotvault.toml`, `./hotvault.toml`, then `HOTVAULT_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HotvaultConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/hotvault/hotvault.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "hotvault.toml";

/// Environment variables that belong to other components and must not be
/// read as config keys (prefix already stripped, lowercase).
const IGNORED_ENV_KEYS: &[&str] = &["master_key"];

const SECTIONS: &[&str] = &["server", "storage", "vault", "network"];

/// Per-user configuration file under the XDG config dir, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hotvault").join("hotvault.toml"))
}

/// Build the full figment: files in the standard hierarchy plus env.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(HotvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG_FILE)).merge(env_provider())
}

/// Load configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<HotvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from one explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<HotvaultConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(HotvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string over the defaults. No env, no files.
pub fn load_config_from_str(toml_content: &str) -> Result<HotvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HotvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// `HOTVAULT_SERVER_PORT` maps to `server.port`,
/// `HOTVAULT_NETWORK_DETECTION_TIMEOUT_MS` to `network.detection_timeout_ms`.
///
/// Only the section prefix is turned into a dot; splitting on every `_` would
/// break keys such as `data_dir`.
fn env_provider() -> Env {
    Env::prefixed("HOTVAULT_")
        .ignore(IGNORED_ENV_KEYS)
        .map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
