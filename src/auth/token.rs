// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public-key verification of compact tokens.
//!
//! Expiry is checked when the token carries `exp` but is not required.
//! A correctly signed token whose payload is `null` or empty verifies to
//! no claims rather than failing as malformed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{crypto, decode, decode_header, Algorithm, DecodingKey, Validation};

use super::{AuthError, Claims};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies a compact `header.payload.signature` token against a public key.
///
/// `Ok(None)` means the token verified but its payload carried no claims.
pub trait TokenService: Send + Sync {
    fn verify(&self, compact_token: &str, public_key: &str) -> Result<Option<Claims>, AuthError>;
}

/// [`TokenService`] backed by `jsonwebtoken`.
#[derive(Debug, Clone, Copy)]
pub struct JwtTokenService {
    algorithm: Algorithm,
}

impl JwtTokenService {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    fn decoding_key(&self, public_key: &str) -> Result<DecodingKey, AuthError> {
        let pem = public_key.as_bytes();
        let key = match self.algorithm {
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
            // Shared-secret algorithms would turn the public key into a MAC key.
            _ => {
                return Err(AuthError::Config {
                    field: "tokenAlgorithm",
                })
            }
        };
        key.map_err(|e| AuthError::InvalidToken(format!("invalid public key: {e}")))
    }

    /// Whether the payload segment is `null` or blank and the signature over
    /// it checks out.
    fn is_signed_empty_payload(&self, compact_token: &str, key: &DecodingKey) -> bool {
        let Some((message, signature)) = compact_token.rsplit_once('.') else {
            return false;
        };
        let Some((_, payload)) = message.split_once('.') else {
            return false;
        };
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload) else {
            return false;
        };

        let empty = bytes.iter().all(u8::is_ascii_whitespace)
            || serde_json::from_slice::<serde_json::Value>(&bytes).is_ok_and(|v| v.is_null());

        let header_matches =
            decode_header(compact_token).is_ok_and(|header| header.alg == self.algorithm);

        empty
            && header_matches
            && crypto::verify(signature, message.as_bytes(), key, self.algorithm).unwrap_or(false)
    }
}

fn rejection(e: &JwtError) -> AuthError {
    let reason = match e.kind() {
        ErrorKind::ExpiredSignature => "token has expired".to_string(),
        ErrorKind::InvalidSignature => "signature is invalid".to_string(),
        ErrorKind::ImmatureSignature => "token is not yet valid".to_string(),
        ErrorKind::InvalidAlgorithm => "unexpected algorithm".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("missing required claim {claim}"),
        _ => format!("malformed token: {e}"),
    };
    tracing::warn!(%reason, "Cookie token rejected");
    AuthError::InvalidToken(reason)
}

impl Default for JwtTokenService {
    fn default() -> Self {
        Self::new(Algorithm::ES256)
    }
}

impl TokenService for JwtTokenService {
    fn verify(&self, compact_token: &str, public_key: &str) -> Result<Option<Claims>, AuthError> {
        let decoding_key = self.decoding_key(public_key)?;

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Claims>(compact_token, &decoding_key, &validation) {
            Ok(token_data) => Ok(Some(token_data.claims)),
            Err(e)
                if matches!(e.kind(), ErrorKind::Json(_))
                    && self.is_signed_empty_payload(compact_token, &decoding_key) =>
            {
                tracing::debug!("Cookie token verified without claims");
                Ok(None)
            }
            Err(e) => Err(rejection(&e)),
        }
    }
}
