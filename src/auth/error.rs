// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned for every rejected bearer token.
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

/// Authentication error type.
///
/// The variants distinguish failure reasons for logging only. Every
/// authentication failure renders the same 401 response so callers learn
/// nothing about why a token was rejected.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token subject does not map to a user
    UnknownSubject,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    /// Get the reason code for this error (logs only).
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::UnknownSubject => write!(f, "Token subject is not a known user"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(msg) = &self {
            tracing::error!(error = %msg, "Authentication failed internally");
            let body = Json(AuthErrorBody {
                error: "Internal server error".to_string(),
            });
            return (status, body).into_response();
        }

        tracing::debug!(reason = self.error_code(), "Rejected request authentication");
        let body = Json(AuthErrorBody {
            error: UNAUTHORIZED_MESSAGE.to_string(),
        });
        (
            status,
            [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
            body,
        )
            .into_response()
    }
}
