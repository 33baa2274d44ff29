// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::CredentialError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Generic 500. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed with internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(entity) => Self::not_found(format!("{entity} not found")),
            StoreError::DuplicateEmail => Self::bad_request("Email already registered"),
            StoreError::HasMissions(_) => {
                Self::conflict("Astronaut still has assigned missions")
            }
            StoreError::Validation(msg) => Self::unprocessable(msg),
            other => Self::internal(other),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::DuplicateEmail => Self::bad_request("Email already registered"),
            CredentialError::InvalidCredentials => {
                Self::unauthorized("Incorrect username or password")
            }
            CredentialError::InvalidInput(msg) => Self::unprocessable(msg),
            CredentialError::Storage(inner) => inner.into(),
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let unauthorized = self.status == StatusCode::UNAUTHORIZED;
        let body = Json(ErrorBody {
            error: self.message,
        });
        let mut response = (self.status, body).into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");

        let internal = ApiError::internal("disk on fire");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message, "Internal server error");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let response = ApiError::unauthorized("Incorrect username or password").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound("Astronaut"), StatusCode::NOT_FOUND),
            (StoreError::DuplicateEmail, StatusCode::BAD_REQUEST),
            (StoreError::HasMissions(1), StatusCode::CONFLICT),
            (StoreError::Validation("title".into()), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }

        let nf = ApiError::from(StoreError::NotFound("Mission"));
        assert_eq!(nf.message, "Mission not found");
    }

    #[test]
    fn credential_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(CredentialError::DuplicateEmail).message,
            "Email already registered"
        );
        assert_eq!(
            ApiError::from(CredentialError::InvalidCredentials).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(CredentialError::InvalidInput("name".into())).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
