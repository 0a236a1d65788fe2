// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hotvault secrets vault.

use std::net::IpAddr;

use thiserror::Error;

/// The primary error type used across all Hotvault crates.
///
/// Variants map onto the caller-visible failure classes: usage errors are
/// client mistakes, authentication and decryption failures are denials, and
/// storage failures are server faults that are never swallowed.
#[derive(Debug, Error)]
pub enum HotvaultError {
    /// A required field is missing or empty, or a name is not directory-safe.
    #[error("usage error: {0}")]
    Usage(String),

    /// Bad credentials or no active session.
    ///
    /// The message never says whether the username or the password was wrong.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A record that must be unique already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// No stored record for the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Ciphertext could not be opened.
    ///
    /// Wrong passphrase, tampering and malformed blobs all collapse into this
    /// one variant so callers cannot tell them apart.
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,

    /// The source address was rejected by the gatekeeper.
    #[error(
        "Access Denied: You must be connected to the secure hotspot. Your IP was detected as: {ip}"
    )]
    AccessDenied { ip: IpAddr },

    /// Storage backend errors (filesystem, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cryptographic setup errors (RNG failure, key construction).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Configuration errors (invalid TOML, bad values, unusable master key).
    #[error("configuration error: {0}")]
    Config(String),

    /// A bounded operation ran out of time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HotvaultError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

impl From<std::io::Error> for HotvaultError {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e)
    }
}

impl From<serde_json::Error> for HotvaultError {
    fn from(e: serde_json::Error) -> Self {
        Self::storage(e)
    }
}
