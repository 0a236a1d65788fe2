// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local hotspot subnet detection.
//!
//! A [`SubnetDetector`] runs an ordered list of named strategies and returns
//! the first subnet any of them finds. Nothing is cached: every call looks at
//! the host's current interfaces, so a hotspot that comes up or changes
//! address is picked up on the next request.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use hotvault_config::model::NetworkConfig;
use hotvault_core::HotvaultError;
use ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

/// Every detected subnet is assumed to be a /24. Hotspot DHCP ranges are
/// /24 on all common phone and laptop implementations.
pub const HOTSPOT_PREFIX_LEN: u8 = 24;

/// Result of a successful detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSubnet {
    pub cidr: IpNetwork,
    /// The local address the subnet was derived from.
    pub representative_ip: IpAddr,
    pub interface_name: Option<String>,
    /// Name of the strategy that produced this result.
    pub strategy: &'static str,
}

impl DetectedSubnet {
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.cidr.contains(ip)
    }
}

/// One IPv4 address of one interface, as seen by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCandidate {
    pub name: String,
    pub address: Ipv4Addr,
    pub is_loopback: bool,
}

/// The /24 network containing `ip`.
pub fn hotspot_subnet(ip: Ipv4Addr) -> IpNetwork {
    let octets = ip.octets();
    let base = Ipv4Addr::new(octets[0], octets[1], octets[2], 0);
    match Ipv4Network::new(base, HOTSPOT_PREFIX_LEN) {
        Ok(net) => IpNetwork::V4(net),
        // Unreachable: 24 is a valid IPv4 prefix.
        Err(_) => IpNetwork::V4(Ipv4Network::from(base)),
    }
}

/// Pick the first non-loopback candidate whose name contains a hotspot
/// keyword (case-insensitive).
pub fn select_hotspot_interface(
    candidates: &[InterfaceCandidate],
    keywords: &[String],
) -> Option<DetectedSubnet> {
    candidates
        .iter()
        .filter(|c| !c.is_loopback && !c.address.is_loopback())
        .find(|c| {
            let name = c.name.to_lowercase();
            keywords
                .iter()
                .any(|k| !k.is_empty() && name.contains(&k.to_lowercase()))
        })
        .map(|c| DetectedSubnet {
            cidr: hotspot_subnet(c.address),
            representative_ip: IpAddr::V4(c.address),
            interface_name: Some(c.name.clone()),
            strategy: INTERFACE_NAME_STRATEGY,
        })
}

/// Enumerate IPv4 interface addresses on this host.
///
/// Enumeration failures yield an empty list.
#[cfg(unix)]
pub fn list_interfaces() -> Vec<InterfaceCandidate> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;

    let addrs = match getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!(error = %e, "interface enumeration failed");
            return Vec::new();
        }
    };

    addrs
        .filter_map(|ifaddr| {
            let sin = ifaddr.address.as_ref()?.as_sockaddr_in()?;
            let address = *std::net::SocketAddrV4::from(*sin).ip();
            Some(InterfaceCandidate {
                is_loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                name: ifaddr.interface_name,
                address,
            })
        })
        .collect()
}

#[cfg(not(unix))]
pub fn list_interfaces() -> Vec<InterfaceCandidate> {
    Vec::new()
}

/// Ask the OS which local IPv4 address it would use to reach `probe`.
///
/// `connect` on a UDP socket only selects a route; no packet is sent.
/// Loopback and unspecified answers count as no answer.
pub fn probe_local_ipv4(probe: SocketAddr) -> Option<Ipv4Addr> {
    let bind_addr: SocketAddr = match probe {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind_addr)
        .inspect_err(|e| debug!(error = %e, "udp probe bind failed"))
        .ok()?;
    socket
        .connect(probe)
        .inspect_err(|e| debug!(error = %e, %probe, "udp probe connect failed"))
        .ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

pub const INTERFACE_NAME_STRATEGY: &str = "interface-name";
pub const UDP_PROBE_STRATEGY: &str = "udp-probe";

type StrategyFn = dyn Fn() -> Option<DetectedSubnet> + Send + Sync;

/// A named detection step.
pub struct DetectionStrategy {
    name: &'static str,
    run: Box<StrategyFn>,
}

impl DetectionStrategy {
    pub fn new(
        name: &'static str,
        run: impl Fn() -> Option<DetectedSubnet> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Match interface names against `keywords`.
    pub fn interface_name(keywords: Vec<String>) -> Self {
        Self::new(INTERFACE_NAME_STRATEGY, move || {
            select_hotspot_interface(&list_interfaces(), &keywords)
        })
    }

    /// Use the source address the OS picks for `probe`.
    pub fn udp_probe(probe: SocketAddr) -> Self {
        Self::new(UDP_PROBE_STRATEGY, move || {
            let ip = probe_local_ipv4(probe)?;
            Some(DetectedSubnet {
                cidr: hotspot_subnet(ip),
                representative_ip: IpAddr::V4(ip),
                interface_name: None,
                strategy: UDP_PROBE_STRATEGY,
            })
        })
    }
}

impl std::fmt::Debug for DetectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionStrategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runs detection strategies in order.
#[derive(Debug)]
pub struct SubnetDetector {
    strategies: Vec<DetectionStrategy>,
}

impl SubnetDetector {
    pub fn new(strategies: Vec<DetectionStrategy>) -> Self {
        Self { strategies }
    }

    /// The default strategy list: interface names, then the UDP probe.
    pub fn from_config(config: &NetworkConfig) -> Result<Self, HotvaultError> {
        let probe: SocketAddr = config.probe_address.parse().map_err(|_| {
            HotvaultError::Config(format!(
                "network.probe_address `{}` is not a socket address",
                config.probe_address
            ))
        })?;
        Ok(Self::new(vec![
            DetectionStrategy::interface_name(config.hotspot_keywords.clone()),
            DetectionStrategy::udp_probe(probe),
        ]))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(DetectionStrategy::name).collect()
    }

    /// First subnet any strategy finds, or `None` when the network is unknown.
    pub fn detect_local_subnet(&self) -> Option<DetectedSubnet> {
        for strategy in &self.strategies {
            if let Some(subnet) = (strategy.run)() {
                debug!(
                    strategy = strategy.name,
                    cidr = %subnet.cidr,
                    interface = subnet.interface_name.as_deref().unwrap_or("-"),
                    "local subnet detected"
                );
                return Some(subnet);
            }
            debug!(strategy = strategy.name, "detection strategy found nothing");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn candidate(name: &str, address: [u8; 4], is_loopback: bool) -> InterfaceCandidate {
        InterfaceCandidate {
            name: name.to_string(),
            address: Ipv4Addr::from(address),
            is_loopback,
        }
    }

    fn keywords() -> Vec<String> {
        NetworkConfig::default().hotspot_keywords
    }

    #[test]
    fn subnet_is_the_enclosing_slash_24() {
        let net = hotspot_subnet(Ipv4Addr::new(192, 168, 43, 1));
        assert_eq!(net.to_string(), "192.168.43.0/24");
        assert!(net.contains("192.168.43.77".parse().unwrap()));
        assert!(!net.contains("192.168.44.1".parse().unwrap()));
    }

    #[test]
    fn hotspot_interface_selected_over_ethernet() {
        let candidates = vec![
            candidate("lo", [127, 0, 0, 1], true),
            candidate("eth0", [10, 0, 0, 5], false),
            candidate("swlan0", [192, 168, 43, 1], false),
        ];
        let subnet = select_hotspot_interface(&candidates, &keywords()).unwrap();
        assert_eq!(subnet.cidr.to_string(), "192.168.43.0/24");
        assert_eq!(subnet.interface_name.as_deref(), Some("swlan0"));
        assert_eq!(subnet.strategy, INTERFACE_NAME_STRATEGY);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let candidates = vec![candidate("SoftAP1", [172, 20, 10, 1], false)];
        assert!(select_hotspot_interface(&candidates, &keywords()).is_some());
    }

    #[test]
    fn loopback_never_selected() {
        // "lo" does not match a keyword, but a loopback named like a hotspot
        // must still be skipped.
        let candidates = vec![candidate("ap-loop", [127, 0, 0, 1], true)];
        assert!(select_hotspot_interface(&candidates, &keywords()).is_none());
    }

    #[test]
    fn client_wifi_interface_is_not_a_hotspot() {
        let candidates = vec![
            candidate("wlan0", [192, 168, 1, 23], false),
            candidate("eth0", [10, 0, 0, 5], false),
        ];
        assert!(select_hotspot_interface(&candidates, &keywords()).is_none());

        let candidates = vec![
            candidate("wlan0", [192, 168, 1, 23], false),
            candidate("swlan0", [192, 168, 43, 1], false),
        ];
        let subnet = select_hotspot_interface(&candidates, &keywords()).unwrap();
        assert_eq!(subnet.interface_name.as_deref(), Some("swlan0"));
    }

    #[test]
    fn no_matching_interface_yields_none() {
        let candidates = vec![candidate("eth0", [10, 0, 0, 5], false)];
        assert!(select_hotspot_interface(&candidates, &keywords()).is_none());
    }

    #[test]
    fn first_successful_strategy_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let late_calls = Arc::clone(&calls);
        let detector = SubnetDetector::new(vec![
            DetectionStrategy::new("empty", || None),
            DetectionStrategy::new("fixed", || {
                Some(DetectedSubnet {
                    cidr: hotspot_subnet(Ipv4Addr::new(10, 42, 0, 1)),
                    representative_ip: "10.42.0.1".parse().unwrap(),
                    interface_name: None,
                    strategy: "fixed",
                })
            }),
            DetectionStrategy::new("never", move || {
                late_calls.fetch_add(1, Ordering::SeqCst);
                None
            }),
        ]);
        let subnet = detector.detect_local_subnet().unwrap();
        assert_eq!(subnet.strategy, "fixed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn all_strategies_failing_is_unknown() {
        let detector = SubnetDetector::new(vec![DetectionStrategy::new("empty", || None)]);
        assert!(detector.detect_local_subnet().is_none());
    }

    #[test]
    fn from_config_uses_default_strategy_order() {
        let detector = SubnetDetector::from_config(&NetworkConfig::default()).unwrap();
        assert_eq!(
            detector.strategy_names(),
            vec![INTERFACE_NAME_STRATEGY, UDP_PROBE_STRATEGY]
        );
    }

    #[test]
    fn from_config_rejects_bad_probe_address() {
        let config = NetworkConfig {
            probe_address: "nowhere".into(),
            ..NetworkConfig::default()
        };
        assert!(matches!(
            SubnetDetector::from_config(&config),
            Err(HotvaultError::Config(_))
        ));
    }

    #[test]
    fn probe_to_loopback_counts_as_failure() {
        assert_eq!(probe_local_ipv4("127.0.0.1:9".parse().unwrap()), None);
    }

    #[cfg(unix)]
    #[test]
    fn host_interfaces_include_loopback() {
        let interfaces = list_interfaces();
        assert!(interfaces.iter().any(|c| c.is_loopback));
    }
}
