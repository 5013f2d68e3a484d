// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Three policies are available, each as a middleware function taking
//! [`AuthState`]:
//!
//! - [`hmac_auth`] - `X-Cloud-Signature` only
//! - [`cookie_auth`] - split cookie token only
//! - [`hmac_cookie_auth`] - HMAC when signed, cookie token otherwise
//!
//! The outcome is stored as [`CurrentUser`] in the request extensions, where
//! the extractors in `extractor.rs` pick it up.
//!
//! ```rust,ignore
//! let auth = AuthState::new(Arc::new(AuthConfig::from_env()?)).require_admin(true);
//!
//! let app = Router::new()
//!     .route("/admin", get(admin_handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, cookie_auth));
//! ```

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::cookie::parse_cookie_header;
use super::{AuthError, CredentialVerifier, MetaHmacCookie, UserClaim};
use crate::config::AuthConfig;

/// Largest request body buffered for signature validation (1 MiB).
pub const MAX_SIGNED_BODY_BYTES: usize = 1024 * 1024;

/// Result of authentication, stored in request extensions.
///
/// `None` when the policy allowed the request through without credentials.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserClaim>);

/// State bound to the auth middleware at startup.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub verifier: Arc<CredentialVerifier>,
    /// Reject callers without the admin role (cookie and composed paths)
    pub require_admin: bool,
    /// Let requests without `X-Cloud-Signature` through on the HMAC path
    pub hmac_optional: bool,
}

impl AuthState {
    /// Create state with a verifier built for `config`.
    pub fn new(config: Arc<AuthConfig>) -> Self {
        let verifier = Arc::new(CredentialVerifier::for_config(&config));
        Self {
            config,
            verifier,
            require_admin: false,
            hmac_optional: false,
        }
    }

    pub fn require_admin(mut self, require_admin: bool) -> Self {
        self.require_admin = require_admin;
        self
    }

    pub fn hmac_optional(mut self, hmac_optional: bool) -> Self {
        self.hmac_optional = hmac_optional;
        self
    }
}

/// HMAC middleware.
pub async fn hmac_auth(State(auth): State<AuthState>, request: Request, next: Next) -> Response {
    with_signed_body(request, next, |parts, body| {
        auth.verifier.verify_hmac(
            &parts.headers,
            body,
            &auth.config.payload_secret,
            !auth.hmac_optional,
        )
    })
    .await
}

/// Cookie token middleware.
pub async fn cookie_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = parse_cookie_header(request.headers());
    match auth
        .verifier
        .verify_cookie(&cookies, &auth.config, auth.require_admin)
    {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(Some(user)));
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Cookie authentication rejected");
            e.into_response()
        }
    }
}

/// HMAC-or-cookie middleware.
pub async fn hmac_cookie_auth(
    State(auth): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    with_signed_body(request, next, |parts, body| {
        let cookies = parse_cookie_header(&parts.headers);
        let meta = MetaHmacCookie {
            headers: &parts.headers,
            body,
            payload_secret: &auth.config.payload_secret,
            must_present_hmac: false,
            cookies: &cookies,
            config: &auth.config,
            require_admin: auth.require_admin,
        };
        auth.verifier.verify_hmac_or_cookie(&meta)
    })
    .await
}

/// Buffer the body, run `verify` on it, then hand the rebuilt request on.
async fn with_signed_body<F>(request: Request, next: Next, verify: F) -> Response
where
    F: FnOnce(&Parts, &str) -> Result<Option<UserClaim>, AuthError>,
{
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, MAX_SIGNED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return AuthError::InvalidBody(e.to_string()).into_response(),
    };

    let user = {
        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text,
            Err(e) => return AuthError::InvalidBody(e.to_string()).into_response(),
        };
        match verify(&parts, text) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "Request authentication rejected");
                return e.into_response();
            }
        }
    };

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}
