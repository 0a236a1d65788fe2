// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-based authenticated encryption for stored secrets.
//!
//! Blob layout: `salt(16) || nonce(12) || ciphertext || tag(16)`. Each call
//! draws a new salt, so the same passphrase yields a different key per blob.

use std::num::NonZeroU32;

use hotvault_core::HotvaultError;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, SALT_LEN};

/// Smallest blob that can possibly decrypt (empty plaintext).
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

#[derive(Debug, Clone, Copy)]
pub struct PassphraseVault {
    iterations: NonZeroU32,
}

impl PassphraseVault {
    pub fn new(iterations: u32) -> Result<Self, HotvaultError> {
        Ok(Self {
            iterations: kdf::iterations(iterations)?,
        })
    }

    pub fn encrypt(&self, plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, HotvaultError> {
        require_passphrase(passphrase)?;
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(passphrase.as_bytes(), &salt, self.iterations);
        let sealed = crypto::seal(&key, plaintext)?;

        let mut blob = Vec::with_capacity(SALT_LEN + sealed.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    /// Wrong passphrase, tampering and malformed input are indistinguishable:
    /// all of them return [`HotvaultError::Decryption`].
    pub fn decrypt(&self, blob: &[u8], passphrase: &str) -> Result<Vec<u8>, HotvaultError> {
        require_passphrase(passphrase)?;
        if blob.len() < MIN_BLOB_LEN {
            return Err(HotvaultError::Decryption);
        }
        let (salt, sealed) = blob.split_at(SALT_LEN);
        let key = kdf::derive_key(passphrase.as_bytes(), salt, self.iterations);
        crypto::open(&key, sealed)
    }
}

fn require_passphrase(passphrase: &str) -> Result<(), HotvaultError> {
    if passphrase.is_empty() {
        return Err(HotvaultError::Usage("passphrase is required".into()));
    }
    Ok(())
}
