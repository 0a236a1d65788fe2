// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side cache of a session's login password.
//!
//! The password is sealed under the master key before it touches disk. An
//! entry that no longer opens (key rotated, file damaged) is simply treated
//! as a missing session, which sends the user back to login.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hotvault_core::{HotvaultError, SessionId};
use hotvault_storage::{SessionRecord, SessionRecords};
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::crypto;
use crate::master_key::MasterKey;

#[derive(Debug, Clone)]
pub struct SessionCredentialCache {
    records: SessionRecords,
    master_key: Arc<MasterKey>,
}

impl SessionCredentialCache {
    pub fn new(records: SessionRecords, master_key: Arc<MasterKey>) -> Self {
        Self {
            records,
            master_key,
        }
    }

    pub fn put(
        &self,
        session_id: &SessionId,
        username: &str,
        password: &str,
    ) -> Result<(), HotvaultError> {
        let sealed = crypto::seal(self.master_key.expose(), password.as_bytes())?;
        let record = SessionRecord {
            username: username.to_string(),
            encrypted_password: STANDARD.encode(sealed),
        };
        self.records.put(session_id, &record)?;
        debug!(session = ?session_id, username, "session credentials cached");
        Ok(())
    }

    /// The session's username and password, or `None` if there is no usable
    /// entry. Only real I/O failures are errors.
    pub fn get(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<(String, SecretString)>, HotvaultError> {
        let Some(record) = self.records.load(session_id)? else {
            return Ok(None);
        };
        let Ok(sealed) = STANDARD.decode(record.encrypted_password.trim()) else {
            warn!(session = ?session_id, "session entry is not valid base64");
            return Ok(None);
        };
        let plaintext = match crypto::open(self.master_key.expose(), &sealed) {
            Ok(plaintext) => plaintext,
            Err(_) => {
                warn!(session = ?session_id, "session entry does not decrypt under the current master key");
                return Ok(None);
            }
        };
        match String::from_utf8(plaintext) {
            Ok(password) => Ok(Some((record.username, SecretString::from(password)))),
            Err(_) => {
                warn!(session = ?session_id, "session password is not utf-8");
                Ok(None)
            }
        }
    }

    /// Remove the entry. Clearing a missing entry is not an error.
    pub fn clear(&self, session_id: &SessionId) -> Result<(), HotvaultError> {
        if self.records.remove(session_id)? {
            debug!(session = ?session_id, "session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hotvault_storage::DataLayout;
    use secrecy::ExposeSecret;

    use super::*;

    fn cache(dir: &tempfile::TempDir, key: [u8; 32]) -> SessionCredentialCache {
        let layout = Arc::new(DataLayout::new(dir.path()));
        SessionCredentialCache::new(
            SessionRecords::new(layout),
            Arc::new(MasterKey::from_bytes(key)),
        )
    }

    fn id(byte: u8) -> SessionId {
        SessionId::from_bytes(&[byte; 24])
    }

    #[test]
    fn put_get_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir, [1; 32]);
        cache.put(&id(1), "carol", "pw").unwrap();

        let (user, password) = cache.get(&id(1)).unwrap().unwrap();
        assert_eq!(user, "carol");
        assert_eq!(password.expose_secret(), "pw");

        cache.clear(&id(1)).unwrap();
        assert!(cache.get(&id(1)).unwrap().is_none());
        cache.clear(&id(1)).unwrap();
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        cache(&dir, [1; 32]).put(&id(2), "carol", "very-distinctive-password").unwrap();
        let path = DataLayout::new(dir.path()).session_file(&id(2));
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(!raw.contains("very-distinctive-password"));
        assert!(raw.contains("carol"));
    }

    #[test]
    fn rotated_master_key_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        cache(&dir, [1; 32]).put(&id(3), "carol", "pw").unwrap();
        assert!(cache(&dir, [2; 32]).get(&id(3)).unwrap().is_none());
    }

    #[test]
    fn sessions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir, [1; 32]);
        cache.put(&id(4), "carol", "a").unwrap();
        cache.put(&id(5), "dave", "b").unwrap();
        cache.clear(&id(4)).unwrap();
        assert!(cache.get(&id(4)).unwrap().is_none());
        assert_eq!(cache.get(&id(5)).unwrap().unwrap().0, "dave");
    }

    #[test]
    fn corrupted_entry_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir, [1; 32]);
        let records = SessionRecords::new(Arc::new(DataLayout::new(dir.path())));
        records
            .put(
                &id(6),
                &SessionRecord {
                    username: "carol".into(),
                    encrypted_password: "!!not base64!!".into(),
                },
            )
            .unwrap();
        assert!(cache.get(&id(6)).unwrap().is_none());
    }
}
