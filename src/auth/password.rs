// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! bcrypt password hashing.
//!
//! Both operations are CPU bound; callers on the async runtime run them
//! through `tokio::task::spawn_blocking`.

/// bcrypt silently ignores input past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}
