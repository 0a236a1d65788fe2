// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk layout under the data directory.
//!
//! ```text
//! <data_dir>/
//!   db/<username>/auth.json
//!   db/<username>/<app_name>/secret.json
//!   server_state/sessions/<session_id>.json
//! ```

use std::path::PathBuf;

use hotvault_core::{validate_name, HotvaultError, NameKind, SessionId};

pub const AUTH_FILE: &str = "auth.json";
pub const SECRET_FILE: &str = "secret.json";

/// Resolves record paths. Every path derived from a user-supplied name goes
/// through name validation first, so nothing escapes the data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn db_dir(&self) -> PathBuf {
        self.root.join("db")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("server_state")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.state_dir().join("sessions")
    }

    pub fn user_dir(&self, username: &str) -> Result<PathBuf, HotvaultError> {
        validate_name(NameKind::Username, username)?;
        Ok(self.db_dir().join(username))
    }

    pub fn auth_file(&self, username: &str) -> Result<PathBuf, HotvaultError> {
        Ok(self.user_dir(username)?.join(AUTH_FILE))
    }

    /// App directories share the user directory with the credential file, so
    /// that file's name is reserved.
    pub fn app_dir(&self, username: &str, app_name: &str) -> Result<PathBuf, HotvaultError> {
        validate_name(NameKind::AppName, app_name)?;
        if app_name == AUTH_FILE {
            return Err(HotvaultError::Usage(format!("app_name `{AUTH_FILE}` is reserved")));
        }
        Ok(self.user_dir(username)?.join(app_name))
    }

    pub fn secret_file(&self, username: &str, app_name: &str) -> Result<PathBuf, HotvaultError> {
        Ok(self.app_dir(username, app_name)?.join(SECRET_FILE))
    }

    pub fn session_file(&self, id: &SessionId) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", id.as_str()))
    }
}
