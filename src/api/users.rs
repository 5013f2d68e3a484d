// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! The same handlers are mounted behind each auth policy; the route decides
//! which credential is accepted.

use axum::Json;

use crate::auth::{AdminOnly, OptionalUser, RequireUser, UserClaim};

/// Get the caller identity established by the auth middleware.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Users",
    responses(
        (status = 200, description = "Caller identity", body = UserClaim),
        (status = 401, description = "Missing or invalid credentials"),
    )
)]
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserClaim> {
    Json(user)
}

/// Like [`get_current_user`], but answers `null` for anonymous callers.
#[utoipa::path(
    get,
    path = "/v1/hmac/whoami",
    tag = "Users",
    responses(
        (status = 200, description = "Caller identity, or null", body = UserClaim),
        (status = 401, description = "Invalid signature"),
    )
)]
pub async fn whoami(OptionalUser(user): OptionalUser) -> Json<Option<UserClaim>> {
    Json(user)
}

/// Admin-only identity endpoint.
#[utoipa::path(
    get,
    path = "/v1/admin/me",
    tag = "Users",
    responses(
        (status = 200, description = "Admin identity", body = UserClaim),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn get_admin(AdminOnly(user): AdminOnly) -> Json<UserClaim> {
    Json(user)
}
