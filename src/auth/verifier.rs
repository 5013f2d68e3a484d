// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The credential verifier and the HMAC-then-cookie policy.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::cookie::CookieMap;
use super::{AuthError, HmacSignature, JwtTokenService, SignatureService, TokenService, UserClaim};
use crate::config::{AuthConfig, CompatMode};

/// Verifies HMAC-signed requests and cookie tokens.
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Clone)]
pub struct CredentialVerifier {
    signer: Arc<dyn SignatureService>,
    tokens: Arc<dyn TokenService>,
}

impl CredentialVerifier {
    /// Build a verifier for the token algorithm named in `config`.
    pub fn for_config(config: &AuthConfig) -> Self {
        Self {
            signer: Arc::new(HmacSignature),
            tokens: Arc::new(JwtTokenService::new(config.token_algorithm)),
        }
    }

    pub fn with_signature_service(mut self, signer: Arc<dyn SignatureService>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_token_service(mut self, tokens: Arc<dyn TokenService>) -> Self {
        self.tokens = tokens;
        self
    }

    pub(super) fn signer(&self) -> &dyn SignatureService {
        self.signer.as_ref()
    }

    pub(super) fn tokens(&self) -> &dyn TokenService {
        self.tokens.as_ref()
    }

    /// Try the HMAC header first and fall back to the cookie token.
    ///
    /// The cookie path only runs when no HMAC signature is present. With
    /// `require_admin` set, the admin gate applies to the HMAC claim too.
    /// Under [`CompatMode::Legacy`] the HMAC claim is not gated, both claims
    /// are dropped and `Ok(None)` is returned whenever neither path fails.
    pub fn verify_hmac_or_cookie(
        &self,
        meta: &MetaHmacCookie<'_>,
    ) -> Result<Option<UserClaim>, AuthError> {
        let hmac_claim = self.verify_hmac(
            meta.headers,
            meta.body,
            meta.payload_secret,
            meta.must_present_hmac,
        )?;

        let claim = match hmac_claim {
            Some(claim) => {
                if meta.require_admin
                    && meta.config.compat == CompatMode::Corrected
                    && !claim.is_admin()
                {
                    return Err(AuthError::Forbidden);
                }
                claim
            }
            None => self.verify_cookie(meta.cookies, meta.config, meta.require_admin)?,
        };

        match meta.config.compat {
            CompatMode::Corrected => Ok(Some(claim)),
            CompatMode::Legacy => Ok(None),
        }
    }
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::for_config(&AuthConfig::default())
    }
}

/// Inputs of [`CredentialVerifier::verify_hmac_or_cookie`].
#[derive(Clone, Copy)]
pub struct MetaHmacCookie<'a> {
    pub headers: &'a HeaderMap,
    /// Request body, already in its canonical string form
    pub body: &'a str,
    pub payload_secret: &'a str,
    pub must_present_hmac: bool,
    pub cookies: &'a CookieMap,
    pub config: &'a AuthConfig,
    pub require_admin: bool,
}
