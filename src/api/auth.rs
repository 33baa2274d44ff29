// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::{ApiForm, ApiJson};

use crate::{
    error::ApiError,
    models::{LoginForm, RegisterRequest, TokenResponse, UserResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Invalid registration data")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .credentials
        .register(&request.name, &request.email, &request.password)
        .await?;
    Ok(Json(user.into()))
}

/// OAuth2 password flow: `username` is the email.
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    tag = "Auth",
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .credentials
        .authenticate(&form.username, &form.password)
        .await?;

    let access_token = state
        .tokens
        .issue(&user.email, state.tokens.default_ttl())
        .map_err(ApiError::internal)?;

    Ok(Json(TokenResponse::bearer(access_token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use axum::http::StatusCode;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Test User".into(),
            email: email.into(),
            password: "testpassword".into(),
        }
    }

    #[tokio::test]
    async fn register_returns_user_without_password() {
        let (state, _temp_dir) = test_state();

        let Json(user) = register(State(state), ApiJson(registration("test@example.com")))
            .await
            .expect("registration succeeds");

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.name, "Test User");
    }

    #[tokio::test]
    async fn duplicate_registration_is_bad_request() {
        let (state, _temp_dir) = test_state();
        register(State(state.clone()), ApiJson(registration("test@example.com")))
            .await
            .unwrap();

        let err = register(State(state), ApiJson(registration("test@example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email already registered");
    }

    #[tokio::test]
    async fn login_issues_token_for_registered_user() {
        let (state, _temp_dir) = test_state();
        register(State(state.clone()), ApiJson(registration("test@example.com")))
            .await
            .unwrap();

        let Json(token) = login(
            State(state.clone()),
            ApiForm(LoginForm {
                username: "test@example.com".into(),
                password: "testpassword".into(),
            }),
        )
        .await
        .expect("login succeeds");

        assert_eq!(token.token_type, "bearer");
        let claims = state.tokens.resolve(&token.access_token).unwrap();
        assert_eq!(claims.sub, "test@example.com");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let (state, _temp_dir) = test_state();
        register(State(state.clone()), ApiJson(registration("test@example.com")))
            .await
            .unwrap();

        let err = login(
            State(state),
            ApiForm(LoginForm {
                username: "test@example.com".into(),
                password: "wrongpassword".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Incorrect username or password");
    }
}
