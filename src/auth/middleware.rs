// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to the protected router subtree:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/astronauts/", get(list_astronauts))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::{authenticate_request, bearer_token};
use crate::state::AppState;

/// Reject requests without a valid bearer token; otherwise add the
/// [`super::AuthenticatedUser`] to the request extensions.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = match bearer_token(request.headers())
        .and_then(|token| authenticate_request(&state.tokens, &state.credentials, token))
    {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(
        user_id = user.user_id,
        expires_at = user.expires_at,
        "Authenticated request"
    );
    request.extensions_mut().insert(user);
    next.run(request).await
}
