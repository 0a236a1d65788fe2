// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hotvault detect` command implementation.
//!
//! Prints what the gatekeeper would see right now: the detected subnet and its
//! host range, the neighbors the kernel knows about, and the decision for a
//! few reference addresses.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use hotvault_config::model::HotvaultConfig;
use hotvault_core::HotvaultError;
use hotvault_netguard::{AccessDecision, DetectedSubnet, Gatekeeper, SubnetDetector};
use ipnetwork::IpNetwork;

use crate::serve::init_tracing;

/// Snapshot of one detection run.
#[derive(Debug)]
pub struct DetectReport {
    pub strategies: Vec<&'static str>,
    pub subnet: Option<DetectedSubnet>,
    pub peers: Vec<String>,
    pub checks: Vec<(IpAddr, AccessDecision)>,
}

pub async fn run_detect(config: &HotvaultConfig) -> Result<(), HotvaultError> {
    init_tracing("warn");
    let strategies = SubnetDetector::from_config(&config.network)?.strategy_names();
    let gatekeeper = Gatekeeper::from_config(&config.network)?;
    let report = build_report(&gatekeeper, strategies).await;
    print!("{report}");
    Ok(())
}

pub async fn build_report(gatekeeper: &Gatekeeper, strategies: Vec<&'static str>) -> DetectReport {
    let subnet = gatekeeper.current_subnet().await;
    let mut peers: Vec<String> = gatekeeper.peers().known_peers().await.into_iter().collect();
    peers.sort();

    let mut probes = vec![IpAddr::V4(Ipv4Addr::LOCALHOST)];
    if let Some(subnet) = &subnet {
        probes.push(subnet.representative_ip);
    }
    if let Some(peer) = peers.iter().find_map(|p| p.parse::<IpAddr>().ok()) {
        probes.push(peer);
    }
    probes.push(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 1)));

    let mut checks = Vec::with_capacity(probes.len());
    for ip in probes {
        checks.push((ip, gatekeeper.evaluate(ip).await));
    }

    DetectReport {
        strategies,
        subnet,
        peers,
        checks,
    }
}

/// First and last usable host of an IPv4 network.
fn host_range(cidr: IpNetwork) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let IpNetwork::V4(net) = cidr else {
        return None;
    };
    if net.prefix() >= 31 {
        return None;
    }
    let first = u32::from(net.network()) + 1;
    let last = u32::from(net.broadcast()) - 1;
    Some((Ipv4Addr::from(first), Ipv4Addr::from(last)))
}

impl fmt::Display for DetectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "  hotvault detect")?;
        writeln!(f, "  {}", "-".repeat(50))?;
        writeln!(f, "  strategies:   {}", self.strategies.join(" -> "))?;

        match &self.subnet {
            Some(subnet) => {
                writeln!(f, "  hotspot ip:   {}", subnet.representative_ip)?;
                writeln!(f, "  network:      {}", subnet.cidr)?;
                if let Some((first, last)) = host_range(subnet.cidr) {
                    writeln!(f, "  host range:   {first} - {last}")?;
                }
                writeln!(
                    f,
                    "  interface:    {}",
                    subnet.interface_name.as_deref().unwrap_or("-")
                )?;
                writeln!(f, "  found by:     {}", subnet.strategy)?;
            }
            None => writeln!(f, "  network:      not detected (only loopback and peers allowed)")?,
        }

        if self.peers.is_empty() {
            writeln!(f, "  peers:        none")?;
        } else {
            writeln!(f, "  peers:        {}", self.peers.join(", "))?;
        }

        writeln!(f, "  self-check:")?;
        for (ip, decision) in &self.checks {
            let verdict = match decision {
                AccessDecision::Allow(reason) => format!("allow ({reason:?})"),
                AccessDecision::Deny => "deny".to_string(),
            };
            writeln!(f, "    {ip:<18} {verdict}")?;
        }
        Ok(())
    }
}
