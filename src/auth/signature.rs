// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HMAC signing of request bodies.
//!
//! Signatures travel as `sha256=<lowercase hex>`. Validation also accepts the
//! bare hex digest and compares in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix carried by signatures produced by [`HmacSignature::sign`].
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Signs payloads with a shared secret and checks signatures.
pub trait SignatureService: Send + Sync {
    fn sign(&self, payload: &str, secret: &str) -> String;

    fn validate(&self, payload: &str, secret: &str, signature: &str) -> bool;
}

/// HMAC-SHA256 implementation of [`SignatureService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSignature;

impl HmacSignature {
    fn mac(payload: &str, secret: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac
    }
}

impl SignatureService for HmacSignature {
    fn sign(&self, payload: &str, secret: &str) -> String {
        let digest = Self::mac(payload, secret).finalize().into_bytes();
        format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
    }

    fn validate(&self, payload: &str, secret: &str, signature: &str) -> bool {
        let digest_hex = signature
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .unwrap_or(signature.trim());

        let Ok(expected) = hex::decode(digest_hex) else {
            return false;
        };

        Self::mac(payload, secret).verify_slice(&expected).is_ok()
    }
}
