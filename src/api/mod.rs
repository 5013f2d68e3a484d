// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    api::health::{HealthChecks, HealthResponse},
    auth::{cookie_auth, hmac_auth, hmac_cookie_auth, AuthState, UserClaim},
    config::AuthConfig,
};

pub mod health;
pub mod users;

pub fn router(config: Arc<AuthConfig>) -> Router {
    let auth = AuthState::new(config);

    let hmac_routes = Router::new()
        .route("/hmac/me", get(users::get_current_user))
        .route_layer(from_fn_with_state(auth.clone(), hmac_auth));

    let optional_hmac_routes = Router::new()
        .route("/hmac/whoami", get(users::whoami))
        .route_layer(from_fn_with_state(auth.clone().hmac_optional(true), hmac_auth));

    let cookie_routes = Router::new()
        .route("/cookie/me", get(users::get_current_user))
        .route_layer(from_fn_with_state(auth.clone(), cookie_auth));

    let admin_routes = Router::new()
        .route("/admin/me", get(users::get_admin))
        .route_layer(from_fn_with_state(
            auth.clone().require_admin(true),
            cookie_auth,
        ));

    let composed_routes = Router::new()
        .route("/me", get(users::get_current_user))
        .route_layer(from_fn_with_state(auth.clone(), hmac_cookie_auth));

    let v1_routes = Router::new()
        .merge(hmac_routes)
        .merge(optional_hmac_routes)
        .merge(cookie_routes)
        .merge(admin_routes)
        .merge(composed_routes);

    Router::new()
        .route("/health", get(health::health))
        .with_state(auth)
        .nest("/v1", v1_routes)
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::get_current_user,
        users::whoami,
        users::get_admin
    ),
    components(schemas(UserClaim, HealthResponse, HealthChecks)),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Caller identity")
    )
)]
struct ApiDoc;
