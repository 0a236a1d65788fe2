// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic core of the Hotvault secrets vault.
//!
//! Two independent layers protect data at rest:
//!
//! - Secrets are sealed with AES-256-GCM under a key derived by PBKDF2 from a
//!   per-secret passphrase the server never stores.
//! - The login password cached for a session is sealed under a random
//!   process-wide master key (envelope encryption), so session files are
//!   useless without the key file or `HOTVAULT_MASTER_KEY`.
//!
//! [`VaultService`] ties both together behind session ids.

pub mod credentials;
pub mod crypto;
pub mod kdf;
pub mod master_key;
pub mod merge;
pub mod passphrase;
pub mod service;
pub mod session_cache;

pub use credentials::CredentialStore;
pub use master_key::{MasterKey, MasterKeySource, MASTER_KEY_ENV_VAR};
pub use passphrase::PassphraseVault;
pub use service::{RetrievedSecret, StoreSecret, UpdateSecret, VaultService};
pub use session_cache::SessionCredentialCache;
