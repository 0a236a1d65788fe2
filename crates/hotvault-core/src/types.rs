// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the Hotvault crates.

use serde::{Deserialize, Serialize};

use crate::error::HotvaultError;

/// Number of random bytes behind a session identifier.
pub const SESSION_ID_BYTES: usize = 24;

/// Opaque session identifier: 24 random bytes, hex-encoded.
///
/// The identifier doubles as a bearer credential and as a file name, so it
/// is only ever constructed from raw bytes or from a string that passes
/// [`SessionId::parse`]. `Debug` shows a short prefix only.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Build a session id from freshly generated random bytes.
    pub fn from_bytes(bytes: &[u8; SESSION_ID_BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse an externally supplied session id (cookie, file name).
    ///
    /// Accepts exactly 48 lowercase or uppercase hex characters and
    /// normalizes to lowercase.
    pub fn parse(value: &str) -> Result<Self, HotvaultError> {
        if value.len() != SESSION_ID_BYTES * 2 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HotvaultError::Usage("malformed session id".to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// The hex-encoded identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId({}...)", &self.0[..8])
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = HotvaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Which kind of name is being validated, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Username,
    AppName,
}

impl NameKind {
    fn label(self) -> &'static str {
        match self {
            NameKind::Username => "username",
            NameKind::AppName => "app_name",
        }
    }
}

/// Maximum length of a username or app name.
pub const MAX_NAME_LEN: usize = 64;

/// Check that a username or app name is safe to use as a directory name.
///
/// Allowed: 1-64 characters from `[A-Za-z0-9._-]`, not starting with `.`.
pub fn validate_name(kind: NameKind, value: &str) -> Result<(), HotvaultError> {
    let label = kind.label();
    if value.is_empty() {
        return Err(HotvaultError::Usage(format!("{label} is required")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(HotvaultError::Usage(format!(
            "{label} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if value.starts_with('.') {
        return Err(HotvaultError::Usage(format!("{label} must not start with '.'")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(HotvaultError::Usage(format!(
            "{label} may only contain letters, digits, '.', '_' and '-'"
        )));
    }
    Ok(())
}
