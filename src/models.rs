// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. Persisted records
//! ([`Astronaut`], [`Mission`]) and their create/update bodies live in
//! [`crate::storage`]; this module adds the shapes that only exist at the
//! HTTP boundary.
//!
//! ## Model Categories
//!
//! - **Authentication**: registration body, token response, user view
//! - **Astronauts**: astronaut view with embedded missions
//! - **Email helpers**: normalization and minimal validation

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use crate::storage::{Astronaut, Mission, User};

// =============================================================================
// Email Helpers
// =============================================================================

/// Canonical form used for storage and comparison of emails.
///
/// Trims surrounding whitespace, applies Unicode NFKC and lower-cases.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Minimal structural check on an already-normalized email.
pub fn validate_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("email must look like name@domain".to_string()),
    }
}

// =============================================================================
// Authentication Models
// =============================================================================

/// Registration request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email (unique)
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// Login form (`application/x-www-form-urlencoded`).
///
/// `username` carries the email, matching the OAuth2 password flow.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Public view of a user. Never includes password material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

// =============================================================================
// Astronaut Models
// =============================================================================

/// Astronaut with the missions it owns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AstronautResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub missions: Vec<Mission>,
}

impl AstronautResponse {
    pub fn new(astronaut: Astronaut, missions: Vec<Mission>) -> Self {
        Self {
            id: astronaut.id,
            name: astronaut.name,
            email: astronaut.email,
            missions,
        }
    }
}

impl From<(Astronaut, Vec<Mission>)> for AstronautResponse {
    fn from((astronaut, missions): (Astronaut, Vec<Mission>)) -> Self {
        Self::new(astronaut, missions)
    }
}

/// Root status payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn normalize_email_applies_nfkc() {
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(normalize_email("ｔｅｓｔ@example.com"), "test@example.com");
    }

    #[test]
    fn validate_email_requires_local_and_domain() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn user_response_has_no_password_fields() {
        let response = UserResponse::from(User {
            id: 3,
            name: "Test User".into(),
            email: "test@example.com".into(),
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], 3);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn token_response_is_bearer() {
        let response = TokenResponse::bearer("abc".into());
        assert_eq!(response.token_type, "bearer");
    }
}
