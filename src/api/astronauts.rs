// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::Auth,
    error::ApiError,
    models::AstronautResponse,
    state::AppState,
    storage::{AstronautUpdate, NewAstronaut},
};

#[utoipa::path(
    get,
    path = "/astronauts/",
    tag = "Astronauts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [AstronautResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_astronauts(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AstronautResponse>>, ApiError> {
    let astronauts = state.store.astronauts().list_with_missions()?;
    Ok(Json(astronauts.into_iter().map(AstronautResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/astronauts/",
    request_body = NewAstronaut,
    tag = "Astronauts",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = AstronautResponse),
        (status = 400, description = "Email already registered"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_astronaut(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewAstronaut>,
) -> Result<(StatusCode, Json<AstronautResponse>), ApiError> {
    let astronaut = state.store.astronauts().create(&request)?;
    tracing::info!(astronaut_id = astronaut.id, user_id = user.user_id, "Created astronaut");
    Ok((
        StatusCode::CREATED,
        Json(AstronautResponse::new(astronaut, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/astronauts/{astronaut_id}",
    params(("astronaut_id" = u64, Path, description = "Astronaut identifier")),
    tag = "Astronauts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AstronautResponse),
        (status = 404, description = "Astronaut not found")
    )
)]
pub async fn get_astronaut(
    Auth(_user): Auth,
    ApiPath(astronaut_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<AstronautResponse>, ApiError> {
    let astronaut = state.store.astronauts().get_with_missions(astronaut_id)?;
    Ok(Json(astronaut.into()))
}

/// Partial update: omitted fields keep their values.
#[utoipa::path(
    put,
    path = "/astronauts/{astronaut_id}",
    params(("astronaut_id" = u64, Path, description = "Astronaut identifier")),
    request_body = AstronautUpdate,
    tag = "Astronauts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AstronautResponse),
        (status = 400, description = "Email already registered"),
        (status = 404, description = "Astronaut not found")
    )
)]
pub async fn update_astronaut(
    Auth(user): Auth,
    ApiPath(astronaut_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AstronautUpdate>,
) -> Result<Json<AstronautResponse>, ApiError> {
    state.store.astronauts().update(astronaut_id, &request)?;
    tracing::info!(astronaut_id, user_id = user.user_id, "Updated astronaut");

    let astronaut = state.store.astronauts().get_with_missions(astronaut_id)?;
    Ok(Json(astronaut.into()))
}

#[utoipa::path(
    delete,
    path = "/astronauts/{astronaut_id}",
    params(("astronaut_id" = u64, Path, description = "Astronaut identifier")),
    tag = "Astronauts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 404, description = "Astronaut not found"),
        (status = 409, description = "Astronaut still has assigned missions")
    )
)]
pub async fn delete_astronaut(
    Auth(user): Auth,
    ApiPath(astronaut_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.store.astronauts().delete(astronaut_id)?;
    tracing::info!(astronaut_id, user_id = user.user_id, "Deleted astronaut");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::state::test_support::test_state;
    use crate::storage::NewMission;

    fn auth() -> Auth {
        Auth(AuthenticatedUser {
            user_id: 1,
            name: "Test User".into(),
            email: "test@example.com".into(),
            expires_at: i64::MAX,
        })
    }

    fn new_astronaut(email: &str) -> NewAstronaut {
        NewAstronaut {
            name: "Jane Doe".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn create_astronaut_success() {
        let (state, _temp_dir) = test_state();

        let (status, Json(astronaut)) = create_astronaut(
            auth(),
            State(state.clone()),
            ApiJson(new_astronaut("jane.doe@example.com")),
        )
        .await
        .expect("astronaut creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(astronaut.email, "jane.doe@example.com");
        assert!(astronaut.missions.is_empty());

        let Json(listed) = list_astronauts(auth(), State(state)).await.unwrap();
        assert_eq!(listed, vec![astronaut]);
    }

    #[tokio::test]
    async fn get_astronaut_embeds_missions() {
        let (state, _temp_dir) = test_state();
        let astronaut = state
            .store
            .astronauts()
            .create(&new_astronaut("jane.doe@example.com"))
            .unwrap();
        let mission = state
            .store
            .missions()
            .create(
                astronaut.id,
                &NewMission {
                    title: "Moon Landing".into(),
                    description: None,
                    status: None,
                },
            )
            .unwrap();

        let Json(response) = get_astronaut(auth(), ApiPath(astronaut.id), State(state))
            .await
            .unwrap();
        assert_eq!(response.missions, vec![mission]);
    }

    #[tokio::test]
    async fn get_missing_astronaut_is_not_found() {
        let (state, _temp_dir) = test_state();

        let err = get_astronaut(auth(), ApiPath(99), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Astronaut not found");
    }

    #[tokio::test]
    async fn update_astronaut_changes_only_supplied_fields() {
        let (state, _temp_dir) = test_state();
        let astronaut = state
            .store
            .astronauts()
            .create(&new_astronaut("jane.doe@example.com"))
            .unwrap();

        let Json(updated) = update_astronaut(
            auth(),
            ApiPath(astronaut.id),
            State(state),
            ApiJson(AstronautUpdate {
                name: Some("Jane Smith".into()),
                email: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Jane Smith");
        assert_eq!(updated.email, "jane.doe@example.com");
    }

    #[tokio::test]
    async fn delete_astronaut_with_missions_conflicts() {
        let (state, _temp_dir) = test_state();
        let astronaut = state
            .store
            .astronauts()
            .create(&new_astronaut("jane.doe@example.com"))
            .unwrap();
        let mission = state
            .store
            .missions()
            .create(
                astronaut.id,
                &NewMission {
                    title: "Mars Rover".into(),
                    description: None,
                    status: None,
                },
            )
            .unwrap();

        let err = delete_astronaut(auth(), ApiPath(astronaut.id), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        state.store.missions().delete(mission.id).unwrap();
        let status = delete_astronaut(auth(), ApiPath(astronaut.id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.store.astronauts().list().unwrap().is_empty());
    }
}
