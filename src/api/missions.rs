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
    state::AppState,
    storage::{Mission, MissionUpdate, NewMission},
};

#[utoipa::path(
    get,
    path = "/astronauts/{astronaut_id}/missions/",
    params(("astronaut_id" = u64, Path, description = "Owning astronaut")),
    tag = "Missions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [Mission]),
        (status = 404, description = "Astronaut not found")
    )
)]
pub async fn list_missions(
    Auth(_user): Auth,
    ApiPath(astronaut_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.store.missions().list_for_astronaut(astronaut_id)?))
}

#[utoipa::path(
    post,
    path = "/astronauts/{astronaut_id}/missions/",
    params(("astronaut_id" = u64, Path, description = "Owning astronaut")),
    request_body = NewMission,
    tag = "Missions",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Mission),
        (status = 404, description = "Astronaut not found"),
        (status = 422, description = "Invalid mission data")
    )
)]
pub async fn create_mission(
    Auth(user): Auth,
    ApiPath(astronaut_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewMission>,
) -> Result<(StatusCode, Json<Mission>), ApiError> {
    let mission = state.store.missions().create(astronaut_id, &request)?;
    tracing::info!(
        mission_id = mission.id,
        astronaut_id,
        user_id = user.user_id,
        "Created mission"
    );
    Ok((StatusCode::CREATED, Json(mission)))
}

#[utoipa::path(
    get,
    path = "/missions/{mission_id}",
    params(("mission_id" = u64, Path, description = "Mission identifier")),
    tag = "Missions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Mission),
        (status = 404, description = "Mission not found")
    )
)]
pub async fn get_mission(
    Auth(_user): Auth,
    ApiPath(mission_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<Mission>, ApiError> {
    Ok(Json(state.store.missions().get(mission_id)?))
}

/// Partial update. `"description": null` clears the description.
#[utoipa::path(
    put,
    path = "/missions/{mission_id}",
    params(("mission_id" = u64, Path, description = "Mission identifier")),
    request_body = MissionUpdate,
    tag = "Missions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Mission),
        (status = 404, description = "Mission not found")
    )
)]
pub async fn update_mission(
    Auth(user): Auth,
    ApiPath(mission_id): ApiPath<u64>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MissionUpdate>,
) -> Result<Json<Mission>, ApiError> {
    let mission = state.store.missions().update(mission_id, &request)?;
    tracing::info!(mission_id, user_id = user.user_id, "Updated mission");
    Ok(Json(mission))
}

#[utoipa::path(
    delete,
    path = "/missions/{mission_id}",
    params(("mission_id" = u64, Path, description = "Mission identifier")),
    tag = "Missions",
    security(("bearer_auth" = [])),
    responses(
        (status = 204),
        (status = 404, description = "Mission not found")
    )
)]
pub async fn delete_mission(
    Auth(user): Auth,
    ApiPath(mission_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.store.missions().delete(mission_id)?;
    tracing::info!(mission_id, user_id = user.user_id, "Deleted mission");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::state::test_support::test_state;
    use crate::storage::{MissionStatus, NewAstronaut};

    fn auth() -> Auth {
        Auth(AuthenticatedUser {
            user_id: 1,
            name: "Test User".into(),
            email: "test@example.com".into(),
            expires_at: i64::MAX,
        })
    }

    fn astronaut_id(state: &AppState) -> u64 {
        state
            .store
            .astronauts()
            .create(&NewAstronaut {
                name: "Jane Doe".into(),
                email: "jane.doe@example.com".into(),
            })
            .unwrap()
            .id
    }

    fn moon_landing() -> NewMission {
        NewMission {
            title: "Moon Landing".into(),
            description: Some("First crewed landing".into()),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_mission_defaults_to_pending() {
        let (state, _temp_dir) = test_state();
        let astronaut_id = astronaut_id(&state);

        let (status, Json(mission)) = create_mission(
            auth(),
            ApiPath(astronaut_id),
            State(state.clone()),
            ApiJson(moon_landing()),
        )
        .await
        .expect("mission creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(mission.status, MissionStatus::Pending);
        assert_eq!(mission.astronaut_id, astronaut_id);

        let Json(listed) = list_missions(auth(), ApiPath(astronaut_id), State(state))
            .await
            .unwrap();
        assert_eq!(listed, vec![mission]);
    }

    #[tokio::test]
    async fn create_mission_for_missing_astronaut_is_not_found() {
        let (state, _temp_dir) = test_state();

        let err = create_mission(auth(), ApiPath(42), State(state.clone()), ApiJson(moon_landing()))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Astronaut not found");
        assert!(matches!(
            state.store.missions().get(1),
            Err(crate::storage::StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_only_update_keeps_other_fields() {
        let (state, _temp_dir) = test_state();
        let astronaut_id = astronaut_id(&state);
        let mission = state
            .store
            .missions()
            .create(astronaut_id, &moon_landing())
            .unwrap();

        let Json(updated) = update_mission(
            auth(),
            ApiPath(mission.id),
            State(state),
            ApiJson(MissionUpdate {
                status: Some(MissionStatus::Completed),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, MissionStatus::Completed);
        assert_eq!(updated.title, mission.title);
        assert_eq!(updated.description, mission.description);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (state, _temp_dir) = test_state();
        let astronaut_id = astronaut_id(&state);
        let mission = state
            .store
            .missions()
            .create(astronaut_id, &moon_landing())
            .unwrap();

        let status = delete_mission(auth(), ApiPath(mission.id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_mission(auth(), ApiPath(mission.id), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Mission not found");
    }
}
