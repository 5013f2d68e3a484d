// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthState;

/// Health check response with auth configuration status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Auth paths that have the configuration they need.
    pub checks: HealthChecks,
}

/// Individual check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// "ok" when a payload secret is configured, "unconfigured" otherwise.
    pub hmac: String,
    /// "ok" when all cookie names and the public key are configured.
    pub cookie: String,
}

fn status(ready: bool) -> String {
    let status = if ready { "ok" } else { "unconfigured" };
    status.to_string()
}

/// Liveness endpoint; reports which auth paths are configured.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health(State(auth): State<AuthState>) -> Json<HealthResponse> {
    let config = &auth.config;
    let cookie_ready = !config.header_cookie_name.is_empty()
        && !config.payload_cookie_name.is_empty()
        && !config.signature_cookie_name.is_empty()
        && !config.public_key.is_empty();

    Json(HealthResponse {
        status: "ok".to_string(),
        checks: HealthChecks {
            hmac: status(!config.payload_secret.is_empty()),
            cookie: status(cookie_ready),
        },
    })
}
