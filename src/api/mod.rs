// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{HeaderValue, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    config::AppConfig,
    models::{
        AstronautResponse, LoginForm, RegisterRequest, StatusResponse, TokenResponse,
        UserResponse,
    },
    state::AppState,
    storage::{AstronautUpdate, Mission, MissionStatus, MissionUpdate, NewAstronaut, NewMission},
};

pub mod astronauts;
pub mod auth;
pub mod extract;
pub mod health;
pub mod missions;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/register/", post(auth::register))
        .route("/token", post(auth::login));

    let protected_routes = Router::new()
        .route(
            "/astronauts/",
            get(astronauts::list_astronauts).post(astronauts::create_astronaut),
        )
        .route(
            "/astronauts/{astronaut_id}",
            get(astronauts::get_astronaut)
                .put(astronauts::update_astronaut)
                .delete(astronauts::delete_astronaut),
        )
        .route(
            "/astronauts/{astronaut_id}/missions/",
            get(missions::list_missions).post(missions::create_mission),
        )
        .route(
            "/missions/{mission_id}",
            get(missions::get_mission)
                .put(missions::update_mission)
                .delete(missions::delete_mission),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id
        )
    });

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(trace_layer)
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
}

/// CORS restricted to the configured origins, with credentials.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Skipping unusable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        astronauts::list_astronauts,
        astronauts::create_astronaut,
        astronauts::get_astronaut,
        astronauts::update_astronaut,
        astronauts::delete_astronaut,
        missions::list_missions,
        missions::create_mission,
        missions::get_mission,
        missions::update_mission,
        missions::delete_mission
    ),
    components(
        schemas(
            StatusResponse,
            RegisterRequest,
            LoginForm,
            TokenResponse,
            UserResponse,
            AstronautResponse,
            NewAstronaut,
            AstronautUpdate,
            Mission,
            MissionStatus,
            NewMission,
            MissionUpdate,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status and probes"),
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Astronauts", description = "Astronaut management"),
        (name = "Missions", description = "Missions assigned to astronauts")
    )
)]
struct ApiDoc;
