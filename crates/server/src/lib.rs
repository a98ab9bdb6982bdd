//! Signup and authentication gateway.
//!
//! Provisions user identities in an external identity provider, links them to
//! client records in the order service, and issues bearer tokens for
//! subsequent access. The signup path is a small saga: every remote step that
//! commits state registers a compensating action, and the first failure
//! unwinds them so no half-provisioned identity is left behind.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::token::TokenCodec;

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod saga;
pub mod token;

/// Process-wide resources shared across handlers via an axum `Extension`.
#[derive(Clone)]
pub struct AppResources {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
}
