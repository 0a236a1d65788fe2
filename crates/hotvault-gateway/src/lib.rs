// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Hotvault.
//!
//! Every request first passes the network gatekeeper; authenticated routes
//! then read the session id from the `hotvault_session` cookie and call into
//! [`hotvault_vault::VaultService`] on a blocking thread.

pub mod error;
pub mod guard;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use handlers::SESSION_COOKIE;
pub use server::{router, start_server, AppState};
