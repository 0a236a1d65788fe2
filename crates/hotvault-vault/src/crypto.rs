// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM sealing with a random nonce per message.
//!
//! Sealed output is `nonce(12) || ciphertext || tag(16)`. A nonce is never
//! reused under the same key because every call draws a fresh one from the
//! system CSPRNG.

use hotvault_core::HotvaultError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;
pub use ring::aead::NONCE_LEN;

/// Fill an array from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], HotvaultError> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| HotvaultError::Crypto("system random number generator failed".into()))?;
    Ok(buf)
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, HotvaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| HotvaultError::Crypto("failed to build AES-256-GCM key".into()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, HotvaultError> {
    let key = aead_key(key)?;
    let nonce_bytes: [u8; NONCE_LEN] = random_bytes()?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| HotvaultError::Crypto("AES-256-GCM encryption failed".into()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

/// Decrypt output of [`seal`]. Any failure, including a truncated input, is
/// reported as [`HotvaultError::Decryption`].
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, HotvaultError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(HotvaultError::Decryption);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| HotvaultError::Decryption)?;

    let key = aead_key(key)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| HotvaultError::Decryption)?;
    Ok(plaintext.to_vec())
}
