// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the normalized user claim handed to handlers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AuthError;
use crate::config::CompatMode;

/// Role value that passes the admin gate.
pub const ADMIN_ROLE: &str = "admin";

/// Claims decoded from a verified cookie token.
///
/// Every identity field is optional; tokens issued by older services omit
/// some of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(
        default,
        rename = "displayName",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    /// Expiration timestamp (validated by jsonwebtoken, not read directly)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Anything else the issuer put in the payload
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Normalized identity of the caller.
///
/// Absent fields stay `None`; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserClaim {
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Taken from the email claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(rename = "systemRole", skip_serializing_if = "Option::is_none")]
    pub system_role: Option<String>,
}

impl UserClaim {
    /// Check if this user carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.system_role.as_deref() == Some(ADMIN_ROLE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Convert verified token claims into a [`UserClaim`].
///
/// The admin gate runs right after the role is read, so an absent role
/// fails it as well.
pub fn normalize(
    claims: Claims,
    require_admin: bool,
    compat: CompatMode,
) -> Result<UserClaim, AuthError> {
    let mut user = UserClaim {
        system_role: non_empty(claims.role),
        ..UserClaim::default()
    };

    if require_admin && !user.is_admin() {
        return Err(AuthError::Forbidden);
    }

    user.user_id = non_empty(claims.uid);
    tracing::debug!(user_id = ?user.user_id, "UserID from claims");
    user.username = non_empty(claims.email);

    match compat {
        CompatMode::Corrected => {
            user.avatar = non_empty(claims.avatar);
            user.display_name = non_empty(claims.display_name);
        }
        CompatMode::Legacy => {
            user.avatar = claims.avatar.filter(|v| v.is_empty());
            user.display_name = claims.display_name.filter(|v| v.is_empty());
        }
    }

    Ok(user)
}
