// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HMAC request verification.
//!
//! A trusted upstream service signs the request body with the shared payload
//! secret and forwards the caller identity in plain headers. Once the
//! signature checks out the headers are taken at face value.

use axum::http::HeaderMap;

use super::{AuthError, CredentialVerifier, UserClaim};

/// Header carrying the body signature.
pub const X_CLOUD_SIGNATURE: &str = "X-Cloud-Signature";

pub const UID_HEADER: &str = "uid";
pub const EMAIL_HEADER: &str = "email";
pub const AVATAR_HEADER: &str = "avatar";
pub const DISPLAY_NAME_HEADER: &str = "displayName";
pub const ROLE_HEADER: &str = "role";

/// Canonical string form of a JSON body, as signed by upstream services.
///
/// Object keys keep their insertion order, matching `JSON.stringify`.
pub fn canonical_body(body: &serde_json::Value) -> String {
    body.to_string()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CredentialVerifier {
    /// Verify the `X-Cloud-Signature` header against `body`.
    ///
    /// Returns `Ok(None)` when the header is absent and `required` is false.
    /// No admin gate is applied on this path.
    pub fn verify_hmac(
        &self,
        headers: &HeaderMap,
        body: &str,
        secret: &str,
        required: bool,
    ) -> Result<Option<UserClaim>, AuthError> {
        let Some(signature) = header_value(headers, X_CLOUD_SIGNATURE) else {
            tracing::info!("HMAC is not presented");
            if required {
                return Err(AuthError::MissingSignature);
            }
            return Ok(None);
        };

        if !self.signer().validate(body, secret, &signature) {
            tracing::error!(error = %AuthError::InvalidSignature, "HMAC validation failed");
            return Err(AuthError::InvalidSignature);
        }

        Ok(Some(UserClaim {
            user_id: header_value(headers, UID_HEADER),
            username: header_value(headers, EMAIL_HEADER),
            avatar: header_value(headers, AVATAR_HEADER),
            display_name: header_value(headers, DISPLAY_NAME_HEADER),
            system_role: header_value(headers, ROLE_HEADER),
        }))
    }
}
