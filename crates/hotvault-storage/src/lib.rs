// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem persistence for Hotvault.
//!
//! Plain JSON files under one data directory, written atomically. This crate
//! only moves bytes; everything it stores is already hashed or encrypted.

pub mod atomic;
pub mod credentials;
pub mod layout;
pub mod records;
pub mod secrets;
pub mod sessions;

pub use credentials::CredentialRecords;
pub use layout::DataLayout;
pub use records::{CredentialRecord, SessionRecord};
pub use secrets::{AppSummary, EncryptedSecretPayload, SecretMetadata, SecretRecordStore};
pub use sessions::SessionRecords;
