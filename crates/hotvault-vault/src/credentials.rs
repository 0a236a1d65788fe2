// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login credential hashing and verification.

use std::num::NonZeroU32;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hotvault_core::HotvaultError;
use hotvault_storage::{CredentialRecord, CredentialRecords};
use tracing::{debug, info, warn};

use crate::kdf;

const METHOD_PREFIX: &str = "pbkdf2:sha256:";

/// Salted PBKDF2 password records, one per user, created once.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    records: CredentialRecords,
    iterations: NonZeroU32,
}

impl CredentialStore {
    pub fn new(records: CredentialRecords, iterations: u32) -> Result<Self, HotvaultError> {
        Ok(Self {
            records,
            iterations: kdf::iterations(iterations)?,
        })
    }

    /// Register a user. Never overwrites an existing record.
    pub fn create_user(&self, username: &str, password: &str) -> Result<(), HotvaultError> {
        if password.is_empty() {
            return Err(HotvaultError::Usage("password is required".into()));
        }
        let salt = kdf::generate_salt()?;
        let hash = kdf::derive_key(password.as_bytes(), &salt, self.iterations);
        let record = CredentialRecord {
            hash: STANDARD.encode(&hash[..]),
            salt: STANDARD.encode(salt),
            method: format!("{METHOD_PREFIX}{}", self.iterations),
        };
        self.records.create(username, &record)?;
        info!(username, "user registered");
        Ok(())
    }

    /// `true` only if a well-formed record exists and the password matches.
    ///
    /// The iteration count stored with the record is used, so records made
    /// under an older setting keep verifying.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let record = match self.records.load(username) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(username, "no credential record");
                return false;
            }
            Err(e) => {
                warn!(username, error = %e, "credential record unreadable");
                return false;
            }
        };
        match parse_record(&record) {
            Some((iterations, salt, hash)) => {
                kdf::verify(password.as_bytes(), &salt, iterations, &hash)
            }
            None => {
                warn!(username, "credential record malformed");
                false
            }
        }
    }
}

fn parse_record(record: &CredentialRecord) -> Option<(NonZeroU32, Vec<u8>, Vec<u8>)> {
    let iterations = record
        .method
        .strip_prefix(METHOD_PREFIX)?
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)?;
    let salt = STANDARD.decode(&record.salt).ok()?;
    let hash = STANDARD.decode(&record.hash).ok()?;
    Some((iterations, salt, hash))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hotvault_storage::DataLayout;

    use super::*;

    fn store(dir: &tempfile::TempDir, iterations: u32) -> CredentialStore {
        let layout = Arc::new(DataLayout::new(dir.path()));
        CredentialStore::new(CredentialRecords::new(layout), iterations).unwrap()
    }

    #[test]
    fn create_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 1_000);
        store.create_user("carol", "pw").unwrap();
        assert!(store.verify("carol", "pw"));
        assert!(!store.verify("carol", "pw2"));
        assert!(!store.verify("dave", "pw"));
    }

    #[test]
    fn second_create_keeps_first_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 1_000);
        store.create_user("carol", "first").unwrap();
        let before = std::fs::read(dir.path().join("db/carol/auth.json")).unwrap();

        assert!(matches!(
            store.create_user("carol", "second"),
            Err(HotvaultError::AlreadyExists(_))
        ));
        let after = std::fs::read(dir.path().join("db/carol/auth.json")).unwrap();
        assert_eq!(before, after);
        assert!(store.verify("carol", "first"));
        assert!(!store.verify("carol", "second"));
    }

    #[test]
    fn record_shape() {
        let dir = tempfile::tempdir().unwrap();
        store(&dir, 1_234).create_user("carol", "pw").unwrap();
        let raw = std::fs::read_to_string(dir.path().join("db/carol/auth.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["method"], "pbkdf2:sha256:1234");
        assert_eq!(STANDARD.decode(value["salt"].as_str().unwrap()).unwrap().len(), 16);
        assert_eq!(STANDARD.decode(value["hash"].as_str().unwrap()).unwrap().len(), 32);
    }

    #[test]
    fn stored_iteration_count_wins_over_current_setting() {
        let dir = tempfile::tempdir().unwrap();
        store(&dir, 1_000).create_user("carol", "pw").unwrap();
        assert!(store(&dir, 2_000).verify("carol", "pw"));
    }

    #[test]
    fn malformed_record_verifies_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db/carol/auth.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"hash":"x","salt":"y","method":"md5"}"#).unwrap();
        assert!(!store(&dir, 1_000).verify("carol", "pw"));
        std::fs::write(&path, "not json").unwrap();
        assert!(!store(&dir, 1_000).verify("carol", "pw"));
    }

    #[test]
    fn invalid_username_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            store(&dir, 1_000).create_user("../evil", "pw"),
            Err(HotvaultError::Usage(_))
        ));
    }
}
