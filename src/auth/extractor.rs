// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated caller.
//!
//! These read the [`CurrentUser`] left by one of the auth middlewares:
//!
//! ```rust,ignore
//! async fn my_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
//!     // user is UserClaim
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, CurrentUser, UserClaim};

fn current_user(parts: &Parts) -> Option<UserClaim> {
    parts
        .extensions
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone())
}

/// Extractor that requires an authenticated caller.
pub struct RequireUser(pub UserClaim);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .map(RequireUser)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor that requires admin role.
///
/// The HMAC path never applies the admin gate, so routes behind
/// `hmac_auth` use this to enforce it.
pub struct AdminOnly(pub UserClaim);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::Forbidden);
        }

        Ok(AdminOnly(user))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no claim is present, instead of rejecting.
pub struct OptionalUser(pub Option<UserClaim>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(current_user(parts)))
    }
}
