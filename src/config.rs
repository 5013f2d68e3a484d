// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AuthConfig`] record the
//! verifiers are bound to at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_HEADER_COOKIE_NAME` | Cookie holding the token header segment | Required for cookie auth |
//! | `AUTH_PAYLOAD_COOKIE_NAME` | Cookie holding the token payload segment | Required for cookie auth |
//! | `AUTH_SIGNATURE_COOKIE_NAME` | Cookie holding the token signature segment | Required for cookie auth |
//! | `AUTH_PUBLIC_KEY_PEM` | PEM public key for token verification (`\n` escapes allowed) | Required for cookie auth |
//! | `AUTH_PUBLIC_KEY_PATH` | File to read the PEM public key from | Used when `AUTH_PUBLIC_KEY_PEM` is unset |
//! | `AUTH_PAYLOAD_SECRET` | Shared secret for `X-Cloud-Signature` | Required for HMAC auth |
//! | `AUTH_TOKEN_ALGORITHM` | Token signature algorithm | `ES256` |
//! | `AUTH_COMPAT_MODE` | `corrected` or `legacy` claim handling | `corrected` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fs;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub const HEADER_COOKIE_NAME_ENV: &str = "AUTH_HEADER_COOKIE_NAME";
pub const PAYLOAD_COOKIE_NAME_ENV: &str = "AUTH_PAYLOAD_COOKIE_NAME";
pub const SIGNATURE_COOKIE_NAME_ENV: &str = "AUTH_SIGNATURE_COOKIE_NAME";
pub const PUBLIC_KEY_PEM_ENV: &str = "AUTH_PUBLIC_KEY_PEM";
pub const PUBLIC_KEY_PATH_ENV: &str = "AUTH_PUBLIC_KEY_PATH";
pub const PAYLOAD_SECRET_ENV: &str = "AUTH_PAYLOAD_SECRET";
pub const TOKEN_ALGORITHM_ENV: &str = "AUTH_TOKEN_ALGORITHM";
pub const COMPAT_MODE_ENV: &str = "AUTH_COMPAT_MODE";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Errors raised while loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    KeyFile { path: String, reason: String },

    #[error("{name} is not a supported value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// How two historical quirks of claim handling are treated.
///
/// `Legacy` keeps the old behavior bit for bit: the cookie path copies
/// avatar/display name only when they are empty, and the composed verifier
/// always yields no claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatMode {
    #[default]
    Corrected,
    Legacy,
}

impl FromStr for CompatMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "corrected" => Ok(CompatMode::Corrected),
            "legacy" => Ok(CompatMode::Legacy),
            _ => Err(()),
        }
    }
}

/// Static auth configuration, immutable for the process lifetime.
///
/// Empty strings count as unset. Completeness is only enforced by the cookie
/// verifier, so an HMAC-only deployment needs nothing but `payload_secret`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub header_cookie_name: String,
    #[serde(default)]
    pub payload_cookie_name: String,
    #[serde(default)]
    pub signature_cookie_name: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub payload_secret: String,
    #[serde(default = "default_token_algorithm")]
    pub token_algorithm: Algorithm,
    #[serde(default)]
    pub compat: CompatMode,
}

fn default_token_algorithm() -> Algorithm {
    Algorithm::ES256
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new("", "", "", "", "")
    }
}

impl AuthConfig {
    /// Create a config with the three cookie names and keys set.
    pub fn new(
        header_cookie_name: impl Into<String>,
        payload_cookie_name: impl Into<String>,
        signature_cookie_name: impl Into<String>,
        public_key: impl Into<String>,
        payload_secret: impl Into<String>,
    ) -> Self {
        Self {
            header_cookie_name: header_cookie_name.into(),
            payload_cookie_name: payload_cookie_name.into(),
            signature_cookie_name: signature_cookie_name.into(),
            public_key: public_key.into(),
            payload_secret: payload_secret.into(),
            token_algorithm: default_token_algorithm(),
            compat: CompatMode::default(),
        }
    }

    pub fn with_token_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.token_algorithm = algorithm;
        self
    }

    pub fn with_compat(mut self, compat: CompatMode) -> Self {
        self.compat = compat;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let public_key = match get(PUBLIC_KEY_PEM_ENV) {
            Some(pem) => pem.replace("\\n", "\n"),
            None => match get(PUBLIC_KEY_PATH_ENV) {
                Some(path) => fs::read_to_string(&path)
                    .map(|pem| pem.trim().to_string())
                    .map_err(|e| ConfigError::KeyFile {
                        path,
                        reason: e.to_string(),
                    })?,
                None => String::new(),
            },
        };

        let token_algorithm = match get(TOKEN_ALGORITHM_ENV) {
            Some(value) => Algorithm::from_str(&value.to_ascii_uppercase()).map_err(|_| {
                ConfigError::InvalidValue {
                    name: TOKEN_ALGORITHM_ENV,
                    value,
                }
            })?,
            None => default_token_algorithm(),
        };

        let compat = match get(COMPAT_MODE_ENV) {
            Some(value) => CompatMode::from_str(&value).map_err(|_| ConfigError::InvalidValue {
                name: COMPAT_MODE_ENV,
                value,
            })?,
            None => CompatMode::default(),
        };

        Ok(Self {
            header_cookie_name: get(HEADER_COOKIE_NAME_ENV).unwrap_or_default(),
            payload_cookie_name: get(PAYLOAD_COOKIE_NAME_ENV).unwrap_or_default(),
            signature_cookie_name: get(SIGNATURE_COOKIE_NAME_ENV).unwrap_or_default(),
            public_key,
            payload_secret: get(PAYLOAD_SECRET_ENV).unwrap_or_default(),
            token_algorithm,
            compat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_all_fields() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            (HEADER_COOKIE_NAME_ENV, "h"),
            (PAYLOAD_COOKIE_NAME_ENV, "p"),
            (SIGNATURE_COOKIE_NAME_ENV, "s"),
            (PUBLIC_KEY_PEM_ENV, "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----"),
            (PAYLOAD_SECRET_ENV, " secret "),
            (TOKEN_ALGORITHM_ENV, "rs256"),
            (COMPAT_MODE_ENV, "Legacy"),
        ]))
        .unwrap();

        assert_eq!(config.header_cookie_name, "h");
        assert_eq!(config.payload_cookie_name, "p");
        assert_eq!(config.signature_cookie_name, "s");
        assert!(config.public_key.contains("\nabc\n"));
        assert_eq!(config.payload_secret, "secret");
        assert_eq!(config.token_algorithm, Algorithm::RS256);
        assert_eq!(config.compat, CompatMode::Legacy);
    }

    #[test]
    fn from_lookup_defaults_when_unset() {
        let config = AuthConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.header_cookie_name.is_empty());
        assert!(config.public_key.is_empty());
        assert_eq!(config.token_algorithm, Algorithm::ES256);
        assert_eq!(config.compat, CompatMode::Corrected);
    }

    #[test]
    fn from_lookup_reads_public_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-----BEGIN PUBLIC KEY-----").unwrap();
        writeln!(file, "-----END PUBLIC KEY-----").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config =
            AuthConfig::from_lookup(lookup_from(&[(PUBLIC_KEY_PATH_ENV, path.as_str())])).unwrap();
        assert!(config.public_key.starts_with("-----BEGIN PUBLIC KEY-----"));
        assert!(config.public_key.ends_with("-----END PUBLIC KEY-----"));
    }

    #[test]
    fn from_lookup_rejects_missing_key_file() {
        let result = AuthConfig::from_lookup(lookup_from(&[(
            PUBLIC_KEY_PATH_ENV,
            "/nonexistent/auth/public.pem",
        )]));
        assert!(matches!(result, Err(ConfigError::KeyFile { .. })));
    }

    #[test]
    fn from_lookup_rejects_unknown_compat_mode() {
        let result = AuthConfig::from_lookup(lookup_from(&[(COMPAT_MODE_ENV, "sometimes")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: COMPAT_MODE_ENV,
                ..
            })
        ));
    }

    #[test]
    fn deserializes_external_field_names() {
        let config: AuthConfig = serde_json::from_str(
            r#"{
                "headerCookieName": "h",
                "payloadCookieName": "p",
                "signatureCookieName": "s",
                "publicKey": "pem",
                "payloadSecret": "secret"
            }"#,
        )
        .unwrap();
        assert_eq!(config.signature_cookie_name, "s");
        assert_eq!(config.payload_secret, "secret");
        assert_eq!(config.token_algorithm, Algorithm::ES256);
        assert_eq!(config.compat, CompatMode::Corrected);
    }
}
