// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie token verification.
//!
//! The token is split across three cookies (header, payload, signature) so
//! the signature cookie can be `HttpOnly` while the payload stays readable by
//! the browser. They are glued back together before verification.

use std::collections::HashMap;
use std::fmt;

use axum::http::{header::COOKIE, HeaderMap};

use super::claims::normalize;
use super::{AuthError, CredentialVerifier, UserClaim};
use crate::config::AuthConfig;

/// Cookies sent with a request, by name.
pub type CookieMap = HashMap<String, String>;

/// Which segment of the split token a cookie carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieFragment {
    Header,
    Payload,
    Signature,
}

impl fmt::Display for CookieFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieFragment::Header => write!(f, "header"),
            CookieFragment::Payload => write!(f, "payload"),
            CookieFragment::Signature => write!(f, "signature"),
        }
    }
}

/// The three raw token segments read from the cookie map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCookie {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

impl AuthCookie {
    /// Read the three segments using the configured cookie names.
    ///
    /// Each cookie name is checked right before its cookie, so the first
    /// problem in header/payload/signature order is the one reported.
    pub fn read(cookies: &CookieMap, config: &AuthConfig) -> Result<Self, AuthError> {
        let header = read_fragment(
            cookies,
            &config.header_cookie_name,
            "headerCookieName",
            CookieFragment::Header,
        )?;
        let payload = read_fragment(
            cookies,
            &config.payload_cookie_name,
            "payloadCookieName",
            CookieFragment::Payload,
        )?;
        let signature = read_fragment(
            cookies,
            &config.signature_cookie_name,
            "signatureCookieName",
            CookieFragment::Signature,
        )?;

        Ok(Self {
            header,
            payload,
            signature,
        })
    }

    /// Compact `header.payload.signature` form.
    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.header, self.payload, self.signature)
    }
}

fn read_fragment(
    cookies: &CookieMap,
    cookie_name: &str,
    config_field: &'static str,
    fragment: CookieFragment,
) -> Result<String, AuthError> {
    if cookie_name.is_empty() {
        return Err(AuthError::Config {
            field: config_field,
        });
    }
    cookies
        .get(cookie_name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(AuthError::MissingCookie(fragment))
}

/// Collect every `Cookie` header of a request into a map.
///
/// Later duplicates win. Pairs without `=` are ignored and surrounding
/// double quotes are stripped from values.
pub fn parse_cookie_header(headers: &HeaderMap) -> CookieMap {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

impl CredentialVerifier {
    /// Verify the token split across the configured cookies.
    ///
    /// Never yields "no claim": every missing piece is an error.
    pub fn verify_cookie(
        &self,
        cookies: &CookieMap,
        config: &AuthConfig,
        require_admin: bool,
    ) -> Result<UserClaim, AuthError> {
        let auth_cookie = AuthCookie::read(cookies, config)?;

        if config.public_key.is_empty() {
            return Err(AuthError::Config { field: "publicKey" });
        }

        let claims = self
            .tokens()
            .verify(&auth_cookie.compact(), &config.public_key)?
            .ok_or(AuthError::NullClaims)?;

        normalize(claims, require_admin, config.compat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenService};
    use crate::config::CompatMode;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
    use std::sync::Arc;

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/es256_private.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/es256_public.pem");
    const OTHER_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/es256_other_public.pem");

    fn config(public_key: &str) -> AuthConfig {
        AuthConfig::new("h", "p", "s", public_key, "payload_secret_1235456778")
    }

    fn cookies_for(role: &str) -> CookieMap {
        let claims = serde_json::json!({
            "uid": "userid_123434576587",
            "email": "amir@telar.dev",
            "avatar": "https://util.telar.dev/api/avatars/234234",
            "displayName": "Amir Movhahedi",
            "role": role,
            "exp": get_current_timestamp() + 60,
        });
        let key = EncodingKey::from_ec_pem(PRIVATE_KEY.as_bytes()).unwrap();
        let token = encode(&Header::new(Algorithm::ES256), &claims, &key).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        CookieMap::from([
            ("h".to_string(), parts[0].to_string()),
            ("p".to_string(), parts[1].to_string()),
            ("s".to_string(), parts[2].to_string()),
        ])
    }

    #[test]
    fn valid_cookies_yield_claim() {
        let user = CredentialVerifier::default()
            .verify_cookie(&cookies_for("admin"), &config(PUBLIC_KEY), true)
            .unwrap();
        assert_eq!(user.user_id.as_deref(), Some("userid_123434576587"));
        assert_eq!(user.username.as_deref(), Some("amir@telar.dev"));
        assert_eq!(user.display_name.as_deref(), Some("Amir Movhahedi"));
        assert!(user.is_admin());
    }

    #[test]
    fn non_admin_is_forbidden_when_admin_required() {
        let result = CredentialVerifier::default().verify_cookie(
            &cookies_for("user"),
            &config(PUBLIC_KEY),
            true,
        );
        assert!(matches!(result, Err(AuthError::Forbidden)));
    }

    #[test]
    fn non_admin_passes_without_gate() {
        let user = CredentialVerifier::default()
            .verify_cookie(&cookies_for("user"), &config(PUBLIC_KEY), false)
            .unwrap();
        assert_eq!(user.system_role.as_deref(), Some("user"));
    }

    #[test]
    fn mismatched_public_key_is_invalid_token() {
        let result = CredentialVerifier::default().verify_cookie(
            &cookies_for("admin"),
            &config(OTHER_PUBLIC_KEY),
            false,
        );
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn each_missing_cookie_is_named() {
        let cases = [
            ("h", CookieFragment::Header),
            ("p", CookieFragment::Payload),
            ("s", CookieFragment::Signature),
        ];
        for (name, fragment) in cases {
            let mut cookies = cookies_for("admin");
            cookies.remove(name);
            let result =
                CredentialVerifier::default().verify_cookie(&cookies, &config(PUBLIC_KEY), false);
            match result {
                Err(AuthError::MissingCookie(missing)) => assert_eq!(missing, fragment),
                other => panic!("expected missing {fragment} cookie, got {other:?}"),
            }

            let mut cookies = cookies_for("admin");
            cookies.insert(name.to_string(), String::new());
            let result =
                CredentialVerifier::default().verify_cookie(&cookies, &config(PUBLIC_KEY), false);
            assert!(matches!(result, Err(AuthError::MissingCookie(f)) if f == fragment));
        }
    }

    #[test]
    fn each_missing_config_field_is_named() {
        let cookies = cookies_for("admin");
        let mut cases: Vec<(AuthConfig, &str)> = Vec::new();

        let mut c = config(PUBLIC_KEY);
        c.header_cookie_name.clear();
        cases.push((c, "headerCookieName"));
        let mut c = config(PUBLIC_KEY);
        c.payload_cookie_name.clear();
        cases.push((c, "payloadCookieName"));
        let mut c = config(PUBLIC_KEY);
        c.signature_cookie_name.clear();
        cases.push((c, "signatureCookieName"));
        cases.push((config(""), "publicKey"));

        for (config, expected) in cases {
            match CredentialVerifier::default().verify_cookie(&cookies, &config, false) {
                Err(AuthError::Config { field }) => assert_eq!(field, expected),
                other => panic!("expected config error for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn shared_secret_algorithm_is_a_config_error() {
        let config = config(PUBLIC_KEY).with_token_algorithm(Algorithm::HS256);
        let result = CredentialVerifier::for_config(&config).verify_cookie(
            &cookies_for("admin"),
            &config,
            false,
        );
        assert!(matches!(
            result,
            Err(AuthError::Config {
                field: "tokenAlgorithm"
            })
        ));
    }

    struct NullTokens;

    impl TokenService for NullTokens {
        fn verify(&self, _: &str, _: &str) -> Result<Option<Claims>, AuthError> {
            Ok(None)
        }
    }

    #[test]
    fn empty_claims_are_rejected() {
        let verifier = CredentialVerifier::default().with_token_service(Arc::new(NullTokens));
        let result = verifier.verify_cookie(&cookies_for("admin"), &config(PUBLIC_KEY), false);
        assert!(matches!(result, Err(AuthError::NullClaims)));
    }

    #[test]
    fn signed_null_token_is_null_claims() {
        let key = EncodingKey::from_ec_pem(PRIVATE_KEY.as_bytes()).unwrap();
        let token = encode(
            &Header::new(Algorithm::ES256),
            &serde_json::Value::Null,
            &key,
        )
        .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let cookies = CookieMap::from([
            ("h".to_string(), parts[0].to_string()),
            ("p".to_string(), parts[1].to_string()),
            ("s".to_string(), parts[2].to_string()),
        ]);

        let result = CredentialVerifier::default().verify_cookie(&cookies, &config(PUBLIC_KEY), false);
        assert!(matches!(result, Err(AuthError::NullClaims)));
    }

    #[test]
    fn legacy_mode_keeps_inverted_avatar_mapping() {
        let config = config(PUBLIC_KEY).with_compat(CompatMode::Legacy);
        let user = CredentialVerifier::default()
            .verify_cookie(&cookies_for("admin"), &config, false)
            .unwrap();
        assert_eq!(user.user_id.as_deref(), Some("userid_123434576587"));
        assert_eq!(user.avatar, None);
        assert_eq!(user.display_name, None);
    }

    #[test]
    fn compact_joins_with_dots() {
        let cookie = AuthCookie {
            header: "a".to_string(),
            payload: "b".to_string(),
            signature: "c".to_string(),
        };
        assert_eq!(cookie.compact(), "a.b.c");
    }

    #[test]
    fn parse_cookie_header_collects_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("h=aaa; p=\"bbb\""));
        headers.append(COOKIE, HeaderValue::from_static("s=c=c; broken; =x"));

        let cookies = parse_cookie_header(&headers);
        assert_eq!(cookies.get("h").map(String::as_str), Some("aaa"));
        assert_eq!(cookies.get("p").map(String::as_str), Some("bbb"));
        assert_eq!(cookies.get("s").map(String::as_str), Some("c=c"));
        assert_eq!(cookies.len(), 3);
    }
}
