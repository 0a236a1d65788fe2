// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Hotvault server.
//!
//! Every section rejects unknown keys so typos surface at startup instead of
//! silently falling back to defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Hotvault configuration. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HotvaultConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where user records, secrets and server state live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key derivation and master key settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Subnet detection and peer discovery settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind. Defaults to all interfaces so hotspot clients can
    /// reach the server; the gatekeeper does the filtering.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory holding `db/` and `server_state/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("hotvault"))
        .unwrap_or_else(|| PathBuf::from("hotvault-data"))
}

/// Vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 rounds for per-secret passphrase keys.
    #[serde(default = "default_passphrase_kdf_iterations")]
    pub passphrase_kdf_iterations: u32,

    /// PBKDF2-HMAC-SHA256 rounds for login password hashes.
    #[serde(default = "default_credential_kdf_iterations")]
    pub credential_kdf_iterations: u32,

    /// Override for the master key file. Defaults to
    /// `<data_dir>/server_state/master.key`.
    #[serde(default)]
    pub master_key_file: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            passphrase_kdf_iterations: default_passphrase_kdf_iterations(),
            credential_kdf_iterations: default_credential_kdf_iterations(),
            master_key_file: None,
        }
    }
}

fn default_passphrase_kdf_iterations() -> u32 {
    600_000
}

fn default_credential_kdf_iterations() -> u32 {
    100_000
}

/// Network detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Substrings that mark an interface as a hotspot/tethering interface.
    /// Matched case-insensitively against the interface name. Plain client
    /// Wi-Fi names such as `wlan0` do not match.
    #[serde(default = "default_hotspot_keywords")]
    pub hotspot_keywords: Vec<String>,

    /// Destination used by the UDP route probe. Nothing is ever sent to it.
    #[serde(default = "default_probe_address")]
    pub probe_address: String,

    #[serde(default = "default_arp_table_path")]
    pub arp_table_path: PathBuf,

    /// Program and arguments that print the neighbor table.
    #[serde(default = "default_neighbor_command")]
    pub neighbor_command: Vec<String>,

    /// Upper bound for subnet detection and the neighbor command.
    #[serde(default = "default_detection_timeout_ms")]
    pub detection_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hotspot_keywords: default_hotspot_keywords(),
            probe_address: default_probe_address(),
            arp_table_path: default_arp_table_path(),
            neighbor_command: default_neighbor_command(),
            detection_timeout_ms: default_detection_timeout_ms(),
        }
    }
}

fn default_hotspot_keywords() -> Vec<String> {
    ["ap", "swlan", "softap", "hotspot", "tether", "rndis"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_probe_address() -> String {
    "10.255.255.255:1".to_string()
}

fn default_arp_table_path() -> PathBuf {
    PathBuf::from("/proc/net/arp")
}

fn default_neighbor_command() -> Vec<String> {
    vec!["ip".to_string(), "neighbor".to_string()]
}

fn default_detection_timeout_ms() -> u64 {
    2000
}

impl HotvaultConfig {
    /// Resolved master key file path.
    pub fn master_key_path(&self) -> PathBuf {
        self.vault
            .master_key_file
            .clone()
            .unwrap_or_else(|| self.storage.data_dir.join("server_state").join("master.key"))
    }
}
