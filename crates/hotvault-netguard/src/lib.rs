// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network gatekeeping for Hotvault.
//!
//! Decides whether a source address belongs to the local hotspot network:
//! [`detect`] finds the subnet, [`peers`] lists neighbors the kernel knows
//! about and [`gatekeeper`] combines both into an allow/deny decision.

pub mod detect;
pub mod gatekeeper;
pub mod peers;

pub use detect::{DetectedSubnet, DetectionStrategy, SubnetDetector, HOTSPOT_PREFIX_LEN};
pub use gatekeeper::{AccessDecision, AllowReason, Gatekeeper};
pub use peers::{PeerRegistry, PeerSet, PeerSource};
