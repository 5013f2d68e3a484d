// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::cookie::CookieFragment;

/// Authentication error type.
///
/// Every variant is terminal for the request: nothing is retried and no
/// partial claim is handed to the next handler.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A configuration field needed by the cookie path is unset
    #[error("[{field}] is not set in the auth configuration")]
    Config { field: &'static str },

    /// One of the three token cookies is absent or empty
    #[error("Cookie {0} not found")]
    MissingCookie(CookieFragment),

    /// HMAC signature header absent while required
    #[error("HMAC signature is not presented")]
    MissingSignature,

    /// HMAC signature does not match the request body
    #[error("HMAC is not valid")]
    InvalidSignature,

    /// Cookie token failed public-key verification
    #[error("Token is not valid: {0}")]
    InvalidToken(String),

    /// Token verified but carried no claims
    #[error("Claims is null")]
    NullClaims,

    /// Admin role required
    #[error("Admin access role is required")]
    Forbidden,

    /// Handler needs a caller but no credential was presented
    #[error("Authentication is required")]
    Unauthenticated,

    /// Request body could not be buffered for signature validation
    #[error("Request body could not be read: {0}")]
    InvalidBody(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Config { .. } => "config_error",
            AuthError::MissingCookie(_) => "missing_cookie",
            AuthError::MissingSignature => "missing_signature",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::NullClaims => "null_claims",
            AuthError::Forbidden => "forbidden",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidBody(_) => "invalid_body",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCookie(_)
            | AuthError::MissingSignature
            | AuthError::InvalidSignature
            | AuthError::InvalidToken(_)
            | AuthError::NullClaims
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AuthError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
