// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault's call contract: every operation an outer surface (HTTP, tests,
//! a future CLI) may perform, expressed over session ids.
//!
//! All methods are synchronous and CPU-heavy (PBKDF2); async callers should
//! run them on a blocking thread.

use std::sync::Arc;

use hotvault_config::HotvaultConfig;
use hotvault_core::types::SESSION_ID_BYTES;
use hotvault_core::{HotvaultError, SessionId};
use hotvault_storage::{
    AppSummary, CredentialRecords, DataLayout, EncryptedSecretPayload, SecretMetadata,
    SecretRecordStore, SessionRecords,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{info, warn};

use crate::credentials::CredentialStore;
use crate::crypto::random_bytes;
use crate::master_key::MasterKey;
use crate::merge::{apply_update, parse_secret, render_secret};
use crate::passphrase::PassphraseVault;
use crate::session_cache::SessionCredentialCache;

const MISSING_SESSION: &str = "missing session credentials; please login again";
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Input for [`VaultService::store_secret`].
pub struct StoreSecret {
    pub app_name: String,
    pub app_username: String,
    pub secret_text: SecretString,
    pub passphrase: SecretString,
}

/// Input for [`VaultService::update_secret`].
pub struct UpdateSecret {
    pub app_name: String,
    pub passphrase: SecretString,
    /// Dotted path such as `db.password`; `None` replaces the whole secret.
    pub key_path: Option<String>,
    pub value: Value,
}

/// A decrypted secret.
pub struct RetrievedSecret {
    pub secret: SecretString,
    pub app_username: String,
    pub timestamp: String,
}

impl std::fmt::Debug for RetrievedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedSecret")
            .field("secret", &"[REDACTED]")
            .field("app_username", &self.app_username)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Facade over the credential store, session cache, passphrase vault and
/// secret record store.
#[derive(Debug)]
pub struct VaultService {
    credentials: CredentialStore,
    sessions: SessionCredentialCache,
    passphrases: PassphraseVault,
    secrets: SecretRecordStore,
}

impl VaultService {
    /// Build the service over `config.storage.data_dir` with an already
    /// resolved master key.
    pub fn new(config: &HotvaultConfig, master_key: Arc<MasterKey>) -> Result<Self, HotvaultError> {
        let layout = Arc::new(DataLayout::new(&config.storage.data_dir));
        Ok(Self {
            credentials: CredentialStore::new(
                CredentialRecords::new(Arc::clone(&layout)),
                config.vault.credential_kdf_iterations,
            )?,
            sessions: SessionCredentialCache::new(
                SessionRecords::new(Arc::clone(&layout)),
                master_key,
            ),
            passphrases: PassphraseVault::new(config.vault.passphrase_kdf_iterations)?,
            secrets: SecretRecordStore::new(layout),
        })
    }

    /// Build the service, resolving the master key from the environment or
    /// the configured key file.
    pub fn open(config: &HotvaultConfig) -> Result<Self, HotvaultError> {
        let master_key = MasterKey::load_or_create(&config.master_key_path())?;
        Self::new(config, Arc::new(master_key))
    }

    pub fn register(&self, username: &str, password: &str) -> Result<SessionId, HotvaultError> {
        require("username", username)?;
        require("password", password)?;
        self.credentials.create_user(username, password)?;
        self.start_session(username, password)
    }

    /// Unknown users and wrong passwords produce the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<SessionId, HotvaultError> {
        require("username", username)?;
        require("password", password)?;
        if !self.credentials.verify(username, password) {
            warn!(username, "login failed");
            return Err(HotvaultError::Authentication(INVALID_CREDENTIALS.into()));
        }
        info!(username, "login succeeded");
        self.start_session(username, password)
    }

    pub fn logout(&self, session_id: &SessionId) -> Result<(), HotvaultError> {
        self.sessions.clear(session_id)
    }

    /// Username bound to a live session.
    pub fn session_user(&self, session_id: &SessionId) -> Result<Option<String>, HotvaultError> {
        Ok(self.sessions.get(session_id)?.map(|(username, _)| username))
    }

    /// Encrypt and store a secret, replacing any previous one for the app.
    pub fn store_secret(
        &self,
        session_id: &SessionId,
        request: StoreSecret,
    ) -> Result<(), HotvaultError> {
        require("app_name", &request.app_name)?;
        require("secret_text", request.secret_text.expose_secret())?;
        require("passphrase", request.passphrase.expose_secret())?;
        let username = self.resolve_session(session_id)?;

        let blob = self.passphrases.encrypt(
            request.secret_text.expose_secret().as_bytes(),
            request.passphrase.expose_secret(),
        )?;
        let payload = EncryptedSecretPayload::new(request.app_username, blob);
        self.secrets.put(&username, &request.app_name, &payload)?;
        info!(username, app_name = %request.app_name, "secret stored");
        Ok(())
    }

    pub fn retrieve_secret(
        &self,
        session_id: &SessionId,
        app_name: &str,
        passphrase: &SecretString,
    ) -> Result<RetrievedSecret, HotvaultError> {
        require("app_name", app_name)?;
        require("passphrase", passphrase.expose_secret())?;
        let username = self.resolve_session(session_id)?;

        let payload = self.load_payload(&username, app_name)?;
        let plaintext = self
            .passphrases
            .decrypt(&payload.ciphertext_blob, passphrase.expose_secret())?;
        Ok(RetrievedSecret {
            secret: SecretString::from(String::from_utf8_lossy(&plaintext).into_owned()),
            app_username: if payload.app_username.is_empty() {
                "N/A".to_string()
            } else {
                payload.app_username.clone()
            },
            timestamp: payload.timestamp(),
        })
    }

    /// Decrypt, modify and re-encrypt a secret. Returns the updated value.
    pub fn update_secret(
        &self,
        session_id: &SessionId,
        request: UpdateSecret,
    ) -> Result<Value, HotvaultError> {
        require("app_name", &request.app_name)?;
        require("passphrase", request.passphrase.expose_secret())?;
        if request.value.is_null() {
            return Err(HotvaultError::Usage("value is required".into()));
        }
        let username = self.resolve_session(session_id)?;
        let passphrase = request.passphrase.expose_secret();

        let payload = self.load_payload(&username, &request.app_name)?;
        let plaintext = self.passphrases.decrypt(&payload.ciphertext_blob, passphrase)?;
        let current = parse_secret(&String::from_utf8_lossy(&plaintext));

        let updated = apply_update(current, request.key_path.as_deref(), request.value)?;
        let rendered = zeroize::Zeroizing::new(render_secret(&updated)?);

        let blob = self.passphrases.encrypt(rendered.as_bytes(), passphrase)?;
        let new_payload = EncryptedSecretPayload::new(payload.app_username, blob);
        self.secrets.put(&username, &request.app_name, &new_payload)?;
        info!(username, app_name = %request.app_name, "secret updated");
        Ok(updated)
    }

    pub fn list_apps(&self, session_id: &SessionId) -> Result<Vec<AppSummary>, HotvaultError> {
        let username = self.resolve_session(session_id)?;
        self.secrets.list_apps(&username)
    }

    pub fn secret_metadata(
        &self,
        session_id: &SessionId,
        app_name: &str,
    ) -> Result<SecretMetadata, HotvaultError> {
        require("app_name", app_name)?;
        let username = self.resolve_session(session_id)?;
        self.secrets
            .metadata(&username, app_name)?
            .ok_or_else(|| HotvaultError::NotFound(format!("no secret stored for `{app_name}`")))
    }

    fn start_session(&self, username: &str, password: &str) -> Result<SessionId, HotvaultError> {
        let session_id = SessionId::from_bytes(&random_bytes::<SESSION_ID_BYTES>()?);
        self.sessions.put(&session_id, username, password)?;
        Ok(session_id)
    }

    fn resolve_session(&self, session_id: &SessionId) -> Result<String, HotvaultError> {
        match self.sessions.get(session_id)? {
            Some((username, _password)) => Ok(username),
            None => Err(HotvaultError::Authentication(MISSING_SESSION.into())),
        }
    }

    fn load_payload(
        &self,
        username: &str,
        app_name: &str,
    ) -> Result<EncryptedSecretPayload, HotvaultError> {
        self.secrets
            .get_latest(username, app_name)?
            .ok_or_else(|| HotvaultError::NotFound(format!("no secret stored for `{app_name}`")))
    }
}

fn require(field: &str, value: &str) -> Result<(), HotvaultError> {
    if value.is_empty() {
        return Err(HotvaultError::Usage(format!("{field} is required")));
    }
    Ok(())
}
