// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide master key for session envelope encryption.
//!
//! Resolution order: `HOTVAULT_MASTER_KEY` (base64 of 32 bytes), then the key
//! file, then a freshly generated key that is written to the key file with
//! owner-only permissions. The key is random, never derived from a password.

use std::path::Path;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use hotvault_core::HotvaultError;
use hotvault_storage::atomic::{read_optional, write_private};
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::{random_bytes, KEY_LEN};

/// Environment variable holding a base64 master key.
pub const MASTER_KEY_ENV_VAR: &str = "HOTVAULT_MASTER_KEY";

/// Where the active key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterKeySource {
    Environment,
    File,
    Generated,
}

pub struct MasterKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
    source: MasterKeySource,
}

impl MasterKey {
    /// Resolve the key from the environment or `key_file`, creating the file
    /// on first run.
    pub fn load_or_create(key_file: &Path) -> Result<Self, HotvaultError> {
        let env_value = std::env::var(MASTER_KEY_ENV_VAR).ok();
        Self::resolve(env_value.as_deref(), key_file)
    }

    /// [`MasterKey::load_or_create`] with the environment value passed in.
    pub fn resolve(env_value: Option<&str>, key_file: &Path) -> Result<Self, HotvaultError> {
        if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
            let bytes = decode_key(value.trim()).ok_or_else(|| {
                HotvaultError::Config(format!(
                    "{MASTER_KEY_ENV_VAR} must be base64 of exactly {KEY_LEN} bytes"
                ))
            })?;
            info!("master key loaded from environment");
            return Ok(Self::new(bytes, MasterKeySource::Environment));
        }

        if let Some(contents) = read_optional(key_file)? {
            let bytes = parse_key_file(&contents).ok_or_else(|| {
                HotvaultError::Config(format!(
                    "master key file {} is not a valid {KEY_LEN}-byte key",
                    key_file.display()
                ))
            })?;
            info!(path = %key_file.display(), "master key loaded from file");
            return Ok(Self::new(bytes, MasterKeySource::File));
        }

        let bytes = Zeroizing::new(random_bytes::<KEY_LEN>()?);
        let encoded = Zeroizing::new(format!("{}\n", URL_SAFE.encode(&bytes[..])));
        write_private(key_file, encoded.as_bytes())?;
        info!(path = %key_file.display(), "generated new master key");
        Ok(Self::new(bytes, MasterKeySource::Generated))
    }

    /// Wrap raw key material. Used by tests and by callers that manage the
    /// key themselves.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self::new(Zeroizing::new(bytes), MasterKeySource::Environment)
    }

    fn new(bytes: Zeroizing<[u8; KEY_LEN]>, source: MasterKeySource) -> Self {
        Self { bytes, source }
    }

    pub fn source(&self) -> MasterKeySource {
        self.source
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

fn decode_key(text: &str) -> Option<Zeroizing<[u8; KEY_LEN]>> {
    [URL_SAFE, STANDARD, URL_SAFE_NO_PAD, STANDARD_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(text).ok())
        .map(Zeroizing::new)
        .and_then(|decoded| <[u8; KEY_LEN]>::try_from(decoded.as_slice()).ok())
        .map(Zeroizing::new)
}

/// Key files hold base64 text; a raw 32-byte file is accepted as well.
fn parse_key_file(contents: &[u8]) -> Option<Zeroizing<[u8; KEY_LEN]>> {
    if let Ok(text) = std::str::from_utf8(contents)
        && let Some(key) = decode_key(text.trim())
    {
        return Some(key);
    }
    <[u8; KEY_LEN]>::try_from(contents).ok().map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn generated_once_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server_state/master.key");

        let first = MasterKey::resolve(None, &path).unwrap();
        assert_eq!(first.source(), MasterKeySource::Generated);
        let second = MasterKey::resolve(None, &path).unwrap();
        assert_eq!(second.source(), MasterKeySource::File);
        assert_eq!(first.expose(), second.expose());
    }

    #[cfg(unix)]
    #[test]
    fn generated_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.key");
        MasterKey::resolve(None, &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn env_value_takes_precedence_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.key");
        MasterKey::resolve(None, &path).unwrap();

        let encoded = STANDARD.encode([7u8; KEY_LEN]);
        let key = MasterKey::resolve(Some(&encoded), &path).unwrap();
        assert_eq!(key.source(), MasterKeySource::Environment);
        assert_eq!(key.expose(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn url_safe_and_unpadded_env_values_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unused.key");
        let bytes = [0xfbu8; KEY_LEN];
        for encoded in [URL_SAFE.encode(bytes), URL_SAFE_NO_PAD.encode(bytes)] {
            let key = MasterKey::resolve(Some(&encoded), &path).unwrap();
            assert_eq!(key.expose(), &bytes);
        }
        assert!(!path.exists());
    }

    #[test]
    fn wrong_length_env_value_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let short = STANDARD.encode([1u8; 16]);
        assert!(matches!(
            MasterKey::resolve(Some(&short), &dir.path().join("k")),
            Err(HotvaultError::Config(_))
        ));
    }

    #[test]
    fn corrupt_key_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.key");
        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(
            MasterKey::resolve(None, &path),
            Err(HotvaultError::Config(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");
    }

    #[test]
    fn raw_key_file_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.key");
        std::fs::write(&path, [0xffu8; KEY_LEN]).unwrap();
        assert_eq!(MasterKey::resolve(None, &path).unwrap().expose(), &[0xff; KEY_LEN]);
    }

    #[test]
    fn debug_redacts_key() {
        let key = MasterKey::from_bytes([0x41; KEY_LEN]);
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("65, 65"));
    }

    #[test]
    #[serial]
    fn load_or_create_reads_env_var() {
        let dir = tempfile::tempdir().unwrap();
        let encoded = URL_SAFE.encode([9u8; KEY_LEN]);
        unsafe { std::env::set_var(MASTER_KEY_ENV_VAR, &encoded) };
        let key = MasterKey::load_or_create(&dir.path().join("k"));
        unsafe { std::env::remove_var(MASTER_KEY_ENV_VAR) };
        assert_eq!(key.unwrap().source(), MasterKeySource::Environment);
    }

    #[test]
    #[serial]
    fn load_or_create_without_env_generates() {
        unsafe { std::env::remove_var(MASTER_KEY_ENV_VAR) };
        let dir = tempfile::tempdir().unwrap();
        let key = MasterKey::load_or_create(&dir.path().join("k")).unwrap();
        assert_eq!(key.source(), MasterKeySource::Generated);
    }
}
