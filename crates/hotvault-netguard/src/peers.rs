// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Neighbor discovery from the kernel ARP table and the `ip neighbor` command.
//!
//! Peers seen by either source are treated as being on the local network,
//! which covers clients whose address falls outside the assumed /24.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use hotvault_config::model::NetworkConfig;
use hotvault_core::HotvaultError;
use tracing::{debug, warn};

/// Address strings of known neighbors.
pub type PeerSet = HashSet<String>;

/// A source of neighbor addresses.
///
/// A source that does not exist on this host (no `/proc`, no `ip` binary)
/// returns an empty list rather than an error.
#[async_trait]
pub trait PeerSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn peers(&self) -> Result<Vec<String>, HotvaultError>;
}

/// Reads `/proc/net/arp`.
#[derive(Debug, Clone)]
pub struct ArpTableSource {
    path: PathBuf,
}

impl ArpTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// IPv4 addresses from the first column of an ARP table, header skipped.
pub fn parse_arp_table(content: &str) -> Vec<String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .filter(|ip| ip.parse::<Ipv4Addr>().is_ok())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PeerSource for ArpTableSource {
    fn name(&self) -> &'static str {
        "arp-table"
    }

    async fn peers(&self) -> Result<Vec<String>, HotvaultError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(parse_arp_table(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "arp table not present");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Runs a neighbor-table command such as `ip neighbor`.
#[derive(Debug, Clone)]
pub struct NeighborCommandSource {
    argv: Vec<String>,
    timeout: Duration,
}

impl NeighborCommandSource {
    pub fn new(argv: Vec<String>, timeout: Duration) -> Self {
        Self { argv, timeout }
    }
}

/// First token of every non-empty line. Both address families are kept.
pub fn parse_neighbor_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PeerSource for NeighborCommandSource {
    fn name(&self) -> &'static str {
        "neighbor-command"
    }

    async fn peers(&self) -> Result<Vec<String>, HotvaultError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Ok(Vec::new());
        };

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => {
                return Err(HotvaultError::Timeout {
                    duration: self.timeout,
                });
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(program = %program, "neighbor command not installed");
                return Ok(Vec::new());
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(HotvaultError::Internal(format!(
                "`{}` exited with {}",
                self.argv.join(" "),
                output.status
            )));
        }
        Ok(parse_neighbor_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Union of all configured peer sources.
pub struct PeerRegistry {
    sources: Vec<Box<dyn PeerSource>>,
}

impl PeerRegistry {
    pub fn new(sources: Vec<Box<dyn PeerSource>>) -> Self {
        Self { sources }
    }

    /// ARP table first, then the neighbor command.
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(vec![
            Box::new(ArpTableSource::new(config.arp_table_path.clone())),
            Box::new(NeighborCommandSource::new(
                config.neighbor_command.clone(),
                Duration::from_millis(config.detection_timeout_ms),
            )),
        ])
    }

    /// Every address any source reports. Failing sources are logged and skipped.
    pub async fn known_peers(&self) -> PeerSet {
        let mut peers = PeerSet::new();
        for source in &self.sources {
            match source.peers().await {
                Ok(found) => {
                    debug!(source = source.name(), count = found.len(), "peers read");
                    peers.extend(found);
                }
                Err(e) => warn!(source = source.name(), error = %e, "peer source failed"),
            }
        }
        peers
    }
}

impl std::fmt::Debug for PeerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("PeerRegistry").field("sources", &names).finish()
    }
}
