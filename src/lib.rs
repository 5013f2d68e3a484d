// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cloud Auth - request credential verification for Axum services
//!
//! Callers prove who they are with either an HMAC-signed request body
//! (`X-Cloud-Signature`) or a signed token split across three cookies. The
//! middleware turns either into a [`auth::UserClaim`] for handlers.
//!
//! ## Modules
//!
//! - `api` - Demo HTTP routes behind each auth policy
//! - `auth` - Verifiers, middleware, and extractors
//! - `config` - Environment configuration and [`config::AuthConfig`]

pub mod api;
pub mod auth;
pub mod config;
