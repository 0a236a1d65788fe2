// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized record shapes as they appear on disk.

use serde::{Deserialize, Serialize};

/// `db/<username>/auth.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Base64 PBKDF2 output.
    pub hash: String,
    /// Base64 salt.
    pub salt: String,
    /// `pbkdf2:sha256:<iterations>`.
    pub method: String,
}

/// `server_state/sessions/<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
    /// Base64 of nonce followed by the AES-GCM sealed password.
    pub encrypted_password: String,
}

/// `db/<username>/<app_name>/secret.json`.
///
/// `password` holds the base64 ciphertext blob, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SecretFile {
    #[serde(default)]
    pub app_username: String,
    pub password: String,
    #[serde(default)]
    pub timestamp: String,
}
