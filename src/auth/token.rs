// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 access tokens.
//!
//! Tokens carry the user's email as `sub` plus `iat`/`exp`. Validation uses no
//! clock leeway and treats `exp <= now` as expired, so a token issued with a
//! zero lifetime is never accepted.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AppConfig;

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user's normalized email
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Issues and verifies access tokens with a shared secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.access_token_ttl)
    }

    /// Lifetime applied by the login endpoint.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn resolve(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    _ => AuthError::MalformedToken,
                }
            })?;

        let claims = token_data.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        Ok(claims)
    }
}
