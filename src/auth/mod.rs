// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Local accounts with bcrypt passwords and HS256 bearer tokens.
//!
//! ## Auth Flow
//!
//! 1. Client registers via `POST /register/` (password hashed with bcrypt)
//! 2. Client logs in via `POST /token` (form `username`/`password`)
//! 3. Server issues an HS256 JWT with `sub` = email and `exp` = now + TTL
//! 4. Client sends `Authorization: Bearer <token>` on protected routes
//! 5. Middleware verifies signature and expiry, then loads the user by `sub`
//!
//! ## Security
//!
//! - Every astronaut and mission endpoint requires authentication
//! - Token failures all render the same 401 with `WWW-Authenticate: Bearer`
//! - Login does equal bcrypt work for unknown emails and wrong passwords
//! - No clock leeway on expiry

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod token;

pub use claims::AuthenticatedUser;
pub use credentials::{CredentialError, CredentialStore};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::require_auth;
pub use token::{Claims, TokenService};
