// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request access decision based on the caller's source address.
//!
//! Allowed: loopback, any address inside the detected hotspot subnet, and
//! any address the peer registry reports. Everything else is denied and
//! logged as a security alert on the `hotvault::security` target. When the
//! subnet cannot be detected only loopback and known peers get through.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

use hotvault_config::model::NetworkConfig;
use hotvault_core::HotvaultError;
use tracing::{debug, warn};

use crate::detect::{DetectedSubnet, SubnetDetector};
use crate::peers::PeerRegistry;

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    Loopback,
    Subnet,
    KnownPeer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(AllowReason),
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }
}

/// Stateless gatekeeper; safe to share behind an `Arc` and call concurrently.
#[derive(Debug)]
pub struct Gatekeeper {
    detector: Arc<SubnetDetector>,
    peers: PeerRegistry,
    detection_timeout: Duration,
}

impl Gatekeeper {
    pub fn new(detector: SubnetDetector, peers: PeerRegistry, detection_timeout: Duration) -> Self {
        Self {
            detector: Arc::new(detector),
            peers,
            detection_timeout,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, HotvaultError> {
        Ok(Self::new(
            SubnetDetector::from_config(config)?,
            PeerRegistry::from_config(config),
            Duration::from_millis(config.detection_timeout_ms),
        ))
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    /// Run subnet detection off the async runtime, bounded by the detection
    /// timeout. Timeouts and panics report an unknown network.
    pub async fn current_subnet(&self) -> Option<DetectedSubnet> {
        let detector = Arc::clone(&self.detector);
        let task = tokio::task::spawn_blocking(move || detector.detect_local_subnet());
        match tokio::time::timeout(self.detection_timeout, task).await {
            Ok(Ok(subnet)) => subnet,
            Ok(Err(e)) => {
                warn!(error = %e, "subnet detection task failed");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.detection_timeout, "subnet detection timed out");
                None
            }
        }
    }

    pub async fn evaluate(&self, remote_ip: IpAddr) -> AccessDecision {
        let ip = remote_ip.to_canonical();

        if ip == IpAddr::V4(Ipv4Addr::LOCALHOST) || ip == IpAddr::V6(Ipv6Addr::LOCALHOST) {
            return AccessDecision::Allow(AllowReason::Loopback);
        }

        match self.current_subnet().await {
            Some(subnet) if subnet.contains(ip) => {
                debug!(remote_ip = %ip, cidr = %subnet.cidr, "request from hotspot subnet");
                return AccessDecision::Allow(AllowReason::Subnet);
            }
            Some(subnet) => debug!(remote_ip = %ip, cidr = %subnet.cidr, "address outside subnet"),
            None => debug!(remote_ip = %ip, "local subnet unknown"),
        }

        if self.peers.known_peers().await.contains(&ip.to_string()) {
            debug!(remote_ip = %ip, "request from known peer");
            return AccessDecision::Allow(AllowReason::KnownPeer);
        }

        warn!(
            target: "hotvault::security",
            remote_ip = %ip,
            "SECURITY ALERT: blocked access attempt"
        );
        AccessDecision::Deny
    }

    pub async fn is_request_allowed(&self, remote_ip: IpAddr) -> bool {
        self.evaluate(remote_ip).await.is_allowed()
    }
}
