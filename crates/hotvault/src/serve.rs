// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hotvault serve` command implementation.
//!
//! Loads the master key, builds the vault and gatekeeper once, and serves the
//! HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use hotvault_config::model::HotvaultConfig;
use hotvault_core::HotvaultError;
use hotvault_gateway::{start_server, AppState};
use hotvault_netguard::Gatekeeper;
use hotvault_vault::{MasterKey, VaultService};
use tracing::{info, warn};

use crate::shutdown;

pub async fn run_serve(config: HotvaultConfig) -> Result<(), HotvaultError> {
    init_tracing(&config.server.log_level);

    info!(data_dir = %config.storage.data_dir.display(), "starting hotvault");

    let master_key_path = config.master_key_path();
    let master_key = tokio::task::spawn_blocking(move || MasterKey::load_or_create(&master_key_path))
        .await
        .map_err(|e| HotvaultError::Internal(format!("master key task failed: {e}")))??;
    info!(source = ?master_key.source(), "master key ready");

    let vault = VaultService::new(&config, Arc::new(master_key))?;
    let gatekeeper = Gatekeeper::from_config(&config.network)?;

    match gatekeeper.current_subnet().await {
        Some(subnet) => info!(
            cidr = %subnet.cidr,
            interface = subnet.interface_name.as_deref().unwrap_or("-"),
            strategy = subnet.strategy,
            "hotspot subnet detected"
        ),
        None => warn!("no hotspot subnet detected; only loopback and known peers will be allowed"),
    }

    let state = AppState {
        vault: Arc::new(vault),
        gatekeeper: Arc::new(gatekeeper),
    };

    let cancel = shutdown::install_signal_handler();
    start_server(&config.server, state, cancel).await?;

    info!("hotvault shut down cleanly");
    Ok(())
}

/// `RUST_LOG` wins; otherwise our crates log at `log_level` and everything
/// else at warn.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Target matching is by prefix, so `hotvault` also covers the library
/// crates and the `hotvault::security` alert target.
fn default_filter(log_level: &str) -> String {
    format!("hotvault={log_level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_uses_configured_level() {
        let filter = default_filter("debug");
        assert_eq!(filter, "hotvault=debug,warn");
        assert!(tracing_subscriber::EnvFilter::try_new(&filter).is_ok());
    }
}
