// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request extractors whose rejections render as [`ApiError`].
//!
//! axum's stock `Json`, `Path` and `Form` reject with plain-text bodies; these
//! wrappers keep the `{"error": ...}` shape for malformed input.

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// URL-encoded form body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        ApiError::unprocessable(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected form body");
        ApiError::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        ApiError::unprocessable(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct MissionTitle {
        title: String,
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"description":"no title"}"#))
            .unwrap();

        let err = ApiJson::<MissionTitle>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("title"));
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Moon Landing"}"#))
            .unwrap();

        let ApiJson(body) = ApiJson::<MissionTitle>::from_request(request, &()).await.unwrap();
        assert_eq!(body.title, "Moon Landing");
    }

    #[tokio::test]
    async fn wrong_content_type_is_unprocessable() {
        let request = Request::builder()
            .body(Body::from("username=a"))
            .unwrap();

        let err = ApiJson::<MissionTitle>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
