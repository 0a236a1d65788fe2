// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret record store: one encrypted payload per (user, app).

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use hotvault_core::HotvaultError;
use serde::Serialize;
use tracing::debug;

use crate::atomic::{read_optional, write_atomic, KeyedLocks};
use crate::layout::{DataLayout, SECRET_FILE};
use crate::records::SecretFile;

/// `YYYYMMDD-HHMMSS`, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// An encrypted secret as the store sees it. The blob is opaque here.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedSecretPayload {
    pub app_username: String,
    pub ciphertext_blob: Vec<u8>,
    /// `None` when the stored timestamp is missing or unparsable.
    pub created_at: Option<NaiveDateTime>,
}

impl EncryptedSecretPayload {
    /// Wrap a fresh blob, stamped with the current local time.
    pub fn new(app_username: impl Into<String>, ciphertext_blob: Vec<u8>) -> Self {
        Self {
            app_username: app_username.into(),
            ciphertext_blob,
            created_at: Some(Local::now().naive_local()),
        }
    }

    /// Timestamp in the on-disk format, or `"Unknown"`.
    pub fn timestamp(&self) -> String {
        self.created_at
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn to_file(&self) -> SecretFile {
        SecretFile {
            app_username: self.app_username.clone(),
            password: STANDARD.encode(&self.ciphertext_blob),
            timestamp: self.timestamp(),
        }
    }

    fn from_file(file: SecretFile) -> Result<Self, HotvaultError> {
        let ciphertext_blob = STANDARD
            .decode(file.password.trim())
            .map_err(|_| HotvaultError::Decryption)?;
        Ok(Self {
            app_username: file.app_username,
            ciphertext_blob,
            created_at: NaiveDateTime::parse_from_str(&file.timestamp, TIMESTAMP_FORMAT).ok(),
        })
    }
}

impl std::fmt::Debug for EncryptedSecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedSecretPayload")
            .field("app_username", &self.app_username)
            .field("ciphertext_len", &self.ciphertext_blob.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// One entry of an app listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSummary {
    pub name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// Unencrypted facts about a stored secret.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretMetadata {
    pub app_username: String,
    pub timestamp: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// File-backed store keyed by (username, app_name).
///
/// Writes replace the whole record atomically and are serialized per key.
/// Concurrent writers to the same key still race in the usual way: the last
/// one to finish wins.
#[derive(Debug)]
pub struct SecretRecordStore {
    layout: Arc<DataLayout>,
    locks: KeyedLocks,
}

impl SecretRecordStore {
    pub fn new(layout: Arc<DataLayout>) -> Self {
        Self {
            layout,
            locks: KeyedLocks::new(),
        }
    }

    /// Store `payload`, replacing any previous one. Returns the record path.
    pub fn put(
        &self,
        username: &str,
        app_name: &str,
        payload: &EncryptedSecretPayload,
    ) -> Result<PathBuf, HotvaultError> {
        let path = self.layout.secret_file(username, app_name)?;
        let bytes = serde_json::to_vec(&payload.to_file())?;
        self.locks.with_lock(&lock_key(username, app_name), || {
            write_atomic(&path, &bytes)
        })?;
        debug!(username, app_name, "secret record written");
        Ok(path)
    }

    /// The current payload, or `None` if nothing was stored for this key.
    pub fn get_latest(
        &self,
        username: &str,
        app_name: &str,
    ) -> Result<Option<EncryptedSecretPayload>, HotvaultError> {
        let path = self.layout.secret_file(username, app_name)?;
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let file = parse_record(&bytes)?;
        EncryptedSecretPayload::from_file(file).map(Some)
    }

    /// Apps with a stored secret, sorted by name.
    pub fn list_apps(&self, username: &str) -> Result<Vec<AppSummary>, HotvaultError> {
        let user_dir = self.layout.user_dir(username)?;
        let entries = match std::fs::read_dir(&user_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut apps = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            match std::fs::metadata(entry.path().join(SECRET_FILE)) {
                Ok(meta) => apps.push(AppSummary {
                    name,
                    modified: modified_time(&meta),
                    size: meta.len(),
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apps)
    }

    /// Metadata for one secret without decrypting it.
    pub fn metadata(
        &self,
        username: &str,
        app_name: &str,
    ) -> Result<Option<SecretMetadata>, HotvaultError> {
        let path = self.layout.secret_file(username, app_name)?;
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let file = parse_record(&bytes)?;
        let meta = std::fs::metadata(&path)?;
        Ok(Some(SecretMetadata {
            app_username: if file.app_username.is_empty() {
                "N/A".to_string()
            } else {
                file.app_username
            },
            timestamp: if file.timestamp.is_empty() {
                "Unknown".to_string()
            } else {
                file.timestamp
            },
            modified: modified_time(&meta),
            size: meta.len(),
        }))
    }
}

/// A record that does not parse is treated like any other damaged ciphertext.
fn parse_record(bytes: &[u8]) -> Result<SecretFile, HotvaultError> {
    serde_json::from_slice(bytes).map_err(|_| HotvaultError::Decryption)
}

fn lock_key(username: &str, app_name: &str) -> String {
    format!("{username}/{app_name}")
}

fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified().map(DateTime::<Utc>::from).unwrap_or_default()
}
