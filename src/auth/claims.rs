// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated user representation.

use serde::Serialize;
use utoipa::ToSchema;

use super::token::Claims;
use crate::storage::User;

/// The user behind a verified bearer token.
///
/// Built once per request by the auth middleware and placed in the request
/// extensions; handlers read it back through [`super::Auth`].
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: u64,
    pub name: String,
    pub email: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn new(user: User, claims: &Claims) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_takes_identity_from_user_and_expiry_from_claims() {
        let user = User {
            id: 7,
            name: "Test User".into(),
            email: "test@example.com".into(),
        };
        let claims = Claims {
            sub: "test@example.com".into(),
            iat: 1_700_000_000,
            exp: 1_700_001_800,
        };

        let authenticated = AuthenticatedUser::new(user, &claims);
        assert_eq!(authenticated.user_id, 7);
        assert_eq!(authenticated.expires_at, 1_700_001_800);

        let json = serde_json::to_value(&authenticated).unwrap();
        assert!(json.get("expires_at").is_none());
    }
}
