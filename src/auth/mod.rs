// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Establishes who is calling from one of two credentials.
//!
//! ## HMAC Flow
//!
//! 1. A trusted upstream service signs the raw request body with the shared
//!    payload secret and sends it as `X-Cloud-Signature: sha256=<hex>`
//! 2. It forwards the caller identity in the `uid`, `email`, `avatar`,
//!    `displayName` and `role` headers
//! 3. The signature is checked; the identity headers become the claim
//!
//! ## Cookie Flow
//!
//! 1. The browser carries a signed token split across three cookies
//!    (header, payload, signature), with configurable names
//! 2. The segments are joined with `.` and verified against the configured
//!    public key
//! 3. The token claims are normalized, optionally behind the admin gate
//!
//! ## Security
//!
//! - Signatures are compared in constant time
//! - Only asymmetric token algorithms are accepted
//! - Clock skew tolerance is 60 seconds
//! - Failures are never retried and never fall through to the next path

pub mod claims;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod hmac;
pub mod middleware;
pub mod signature;
pub mod token;
pub mod verifier;

pub use claims::{normalize, Claims, UserClaim, ADMIN_ROLE};
pub use cookie::{parse_cookie_header, AuthCookie, CookieFragment, CookieMap};
pub use error::AuthError;
pub use extractor::{AdminOnly, OptionalUser, RequireUser};
pub use hmac::{canonical_body, X_CLOUD_SIGNATURE};
pub use middleware::{cookie_auth, hmac_auth, hmac_cookie_auth, AuthState, CurrentUser};
pub use signature::{HmacSignature, SignatureService};
pub use token::{JwtTokenService, TokenService};
pub use verifier::{CredentialVerifier, MetaHmacCookie};
