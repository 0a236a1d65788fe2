// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw credential record I/O. Hashing lives in `hotvault-vault`.

use std::sync::Arc;

use hotvault_core::HotvaultError;

use crate::atomic::{create_new, read_optional};
use crate::layout::DataLayout;
use crate::records::CredentialRecord;

#[derive(Debug, Clone)]
pub struct CredentialRecords {
    layout: Arc<DataLayout>,
}

impl CredentialRecords {
    pub fn new(layout: Arc<DataLayout>) -> Self {
        Self { layout }
    }

    /// Write the record for a new user. Fails with `AlreadyExists` if the
    /// user already has one; the existing record is left untouched.
    pub fn create(&self, username: &str, record: &CredentialRecord) -> Result<(), HotvaultError> {
        let path = self.layout.auth_file(username)?;
        let bytes = serde_json::to_vec_pretty(record)?;
        create_new(&path, &bytes).map_err(|e| match e {
            HotvaultError::AlreadyExists(_) => {
                HotvaultError::AlreadyExists(format!("user `{username}` already exists"))
            }
            other => other,
        })
    }

    /// Load a user's record. Malformed JSON is a `Storage` error.
    pub fn load(&self, username: &str) -> Result<Option<CredentialRecord>, HotvaultError> {
        let path = self.layout.auth_file(username)?;
        match read_optional(&path)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
