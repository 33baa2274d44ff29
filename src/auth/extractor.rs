// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::credentials::{CredentialError, CredentialStore};
use super::token::TokenService;
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Protected routes run [`super::middleware::require_auth`] first, which
/// leaves the user in the request extensions. Without the middleware the
/// extractor verifies the bearer token itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers)?;
        let user = authenticate_request(&state.tokens, &state.credentials, token)?;
        Ok(Auth(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Resolve a bearer token to the user it names.
///
/// A valid token whose subject no longer matches a user is rejected like any
/// other bad token. Storage failures surface as internal errors.
pub fn authenticate_request(
    tokens: &TokenService,
    credentials: &CredentialStore,
    token: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let claims = tokens.resolve(token)?;

    let user = credentials
        .find_by_email(&claims.sub)
        .map_err(|e| match e {
            CredentialError::InvalidInput(_) => AuthError::UnknownSubject,
            other => AuthError::InternalError(other.to_string()),
        })?
        .ok_or(AuthError::UnknownSubject)?;

    Ok(AuthenticatedUser::new(user, &claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use axum::http::Request;
    use chrono::Duration;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _temp_dir) = test_state();
        let user = state
            .credentials
            .register("Test User", "test@example.com", "testpassword")
            .await
            .unwrap();
        let token = state
            .tokens
            .issue(&user.email, state.tokens.default_ttl())
            .unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let Auth(authenticated) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(authenticated.user_id, user.id);
        assert_eq!(authenticated.email, "test@example.com");
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_auth(None);

        let user = AuthenticatedUser {
            user_id: 42,
            name: "From Middleware".to_string(),
            email: "middleware@example.com".to_string(),
            expires_at: 0,
        };
        parts.extensions.insert(user.clone());

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted, user);
    }

    #[tokio::test]
    async fn token_for_unknown_subject_is_rejected() {
        let (state, _temp_dir) = test_state();
        let token = state
            .tokens
            .issue("ghost@example.com", Duration::minutes(5))
            .unwrap();

        let result = authenticate_request(&state.tokens, &state.credentials, &token);
        assert!(matches!(result, Err(AuthError::UnknownSubject)));
    }

    #[test]
    fn bearer_token_parsing() {
        let headers = |value: &str| {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value.parse().unwrap());
            headers
        };

        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
    }
}
