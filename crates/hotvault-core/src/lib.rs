// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hotvault secrets vault.
//!
//! Provides the error taxonomy and the small set of types every other crate
//! in the workspace shares.

pub mod error;
pub mod types;

pub use error::HotvaultError;
pub use types::{validate_name, NameKind, SessionId};
