//! Identity provider boundary.
//!
//! The gateway never talks to the provider's wire API directly from the
//! orchestrators; everything goes through the [`IdentityProvider`] trait so
//! the saga can be exercised against in-memory fakes.

pub mod http;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ProviderError;

pub use http::HttpIdentityProvider;

/// Custom attribute carrying the natural key on every account.
pub const ATTR_CPF: &str = "custom:cpf";
/// Custom attribute carrying the linked client record id, set once the
/// signup saga (or the trusted auth path) has resolved one.
pub const ATTR_CLIENT_ID: &str = "custom:client_id";

/// Attribute map attached to an account. Keys are provider attribute names.
pub type AccountAttributes = BTreeMap<String, String>;

/// Token triple returned by the provider's password login flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// Capability interface to the identity provider.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait IdentityProvider: Send + Sync {
    /// Create a password-bearing account. Returns the provider-assigned
    /// opaque subject identifier.
    fn create_account(
        &self,
        username: &str,
        password: &str,
        attrs: AccountAttributes,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Administratively create a password-less account with confirmation
    /// suppressed. Used by the trusted auth path, which only needs a claim
    /// record, not a login identity.
    fn provision_account(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    /// Administratively confirm an account, bypassing any out-of-band
    /// confirmation channel.
    fn confirm_account(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Fetch the account's attribute map.
    fn get_attributes(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<AccountAttributes, ProviderError>> + Send;

    /// Merge the given attributes into the account's attribute map.
    fn update_attributes(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Delete an account. Deleting an already-absent account succeeds, so
    /// saga compensation can run without caring how far creation got.
    fn delete_account(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Password login. Returns the provider's token triple.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<ProviderTokens, ProviderError>> + Send;
}
