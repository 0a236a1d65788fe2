// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw session record I/O. Encryption lives in `hotvault-vault`.

use std::sync::Arc;

use hotvault_core::{HotvaultError, SessionId};
use tracing::warn;

use crate::atomic::{read_optional, remove_if_exists, write_private};
use crate::layout::DataLayout;
use crate::records::SessionRecord;

#[derive(Debug, Clone)]
pub struct SessionRecords {
    layout: Arc<DataLayout>,
}

impl SessionRecords {
    pub fn new(layout: Arc<DataLayout>) -> Self {
        Self { layout }
    }

    pub fn put(&self, id: &SessionId, record: &SessionRecord) -> Result<(), HotvaultError> {
        let bytes = serde_json::to_vec(record)?;
        write_private(&self.layout.session_file(id), &bytes)
    }

    /// Load a session record. An unparsable file is reported as absent.
    pub fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, HotvaultError> {
        let Some(bytes) = read_optional(&self.layout.session_file(id))? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(session = ?id, error = %e, "ignoring unparsable session record");
                Ok(None)
            }
        }
    }

    /// Delete a session record. Missing records are fine.
    pub fn remove(&self, id: &SessionId) -> Result<bool, HotvaultError> {
        remove_if_exists(&self.layout.session_file(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let records = SessionRecords::new(Arc::new(DataLayout::new(dir.path())));
        let id = SessionId::from_bytes(&[3; 24]);
        let record = SessionRecord {
            username: "carol".into(),
            encrypted_password: "AAAA".into(),
        };

        records.put(&id, &record).unwrap();
        assert_eq!(records.load(&id).unwrap(), Some(record));
        assert!(records.remove(&id).unwrap());
        assert!(!records.remove(&id).unwrap());
        assert_eq!(records.load(&id).unwrap(), None);
    }

    #[test]
    fn garbage_record_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Arc::new(DataLayout::new(dir.path()));
        let records = SessionRecords::new(Arc::clone(&layout));
        let id = SessionId::from_bytes(&[4; 24]);
        std::fs::create_dir_all(layout.sessions_dir()).unwrap();
        std::fs::write(layout.session_file(&id), b"not json").unwrap();
        assert_eq!(records.load(&id).unwrap(), None);
    }
}
