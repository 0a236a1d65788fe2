// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation.

use std::num::NonZeroU32;

use hotvault_core::HotvaultError;
use ring::pbkdf2;
use zeroize::Zeroizing;

use crate::crypto::random_bytes;

pub const SALT_LEN: usize = 16;
pub const DERIVED_KEY_LEN: usize = 32;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Validated iteration count.
pub fn iterations(count: u32) -> Result<NonZeroU32, HotvaultError> {
    NonZeroU32::new(count)
        .ok_or_else(|| HotvaultError::Config("PBKDF2 iteration count must be non-zero".into()))
}

/// Derive a 32-byte key. The output is zeroed on drop.
pub fn derive_key(
    secret: &[u8],
    salt: &[u8],
    iterations: NonZeroU32,
) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2::derive(ALGORITHM, iterations, salt, secret, out.as_mut());
    out
}

/// Constant-time check that `secret` derives to `expected`.
pub fn verify(secret: &[u8], salt: &[u8], iterations: NonZeroU32, expected: &[u8]) -> bool {
    pbkdf2::verify(ALGORITHM, iterations, salt, secret, expected).is_ok()
}

pub fn generate_salt() -> Result<[u8; SALT_LEN], HotvaultError> {
    random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> NonZeroU32 {
        iterations(1_000).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key(b"hunter2", &[1; SALT_LEN], fast());
        let b = derive_key(b"hunter2", &[1; SALT_LEN], fast());
        assert_eq!(*a, *b);
    }

    #[test]
    fn salt_and_secret_both_matter() {
        let base = derive_key(b"hunter2", &[1; SALT_LEN], fast());
        assert_ne!(*base, *derive_key(b"hunter3", &[1; SALT_LEN], fast()));
        assert_ne!(*base, *derive_key(b"hunter2", &[2; SALT_LEN], fast()));
    }

    #[test]
    fn verify_matches_derive() {
        let key = derive_key(b"pw", &[9; SALT_LEN], fast());
        assert!(verify(b"pw", &[9; SALT_LEN], fast(), key.as_ref()));
        assert!(!verify(b"pw!", &[9; SALT_LEN], fast(), key.as_ref()));
        assert!(!verify(b"pw", &[9; SALT_LEN], iterations(1_001).unwrap(), key.as_ref()));
    }

    /// RFC 7914 section 11 test vector, truncated to 32 bytes.
    #[test]
    fn known_answer() {
        let key = derive_key(b"passwd", b"salt", iterations(1).unwrap());
        assert_eq!(
            key[..8],
            [0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f]
        );
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(matches!(iterations(0), Err(HotvaultError::Config(_))));
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
