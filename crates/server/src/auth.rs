//! Authenticate and login flows.
//!
//! The trusted-caller path (`authenticate`) resolves or creates a client
//! record for a CPF and mints a gateway token bound to it. Unlike signup it
//! runs no compensation: it never creates a password-bearing login identity,
//! only a claim record, so a partially-completed run leaves nothing that
//! needs rolling back beyond the client record itself, which is accepted
//! residue.

use std::sync::Arc;

use time::Duration;
use uuid::Uuid;

use crate::directory::ClientDirectory;
use crate::error::{AuthError, ProviderError};
use crate::identity::{
    ATTR_CLIENT_ID, ATTR_CPF, AccountAttributes, IdentityProvider, ProviderTokens,
};
use crate::token::TokenCodec;

/// Drives the authenticate and login flows.
pub struct AuthOrchestrator<I, C> {
    identity: Arc<I>,
    directory: Arc<C>,
    tokens: Arc<TokenCodec>,
    token_ttl: Duration,
}

impl<I, C> AuthOrchestrator<I, C>
where
    I: IdentityProvider,
    C: ClientDirectory,
{
    pub fn new(
        identity: Arc<I>,
        directory: Arc<C>,
        tokens: Arc<TokenCodec>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            identity,
            directory,
            tokens,
            token_ttl,
        }
    }

    /// Resolve (or create) the client record for `cpf` and issue a gateway
    /// token carrying its id.
    ///
    /// When the record is created here, a password-less provider account is
    /// provisioned alongside it, pre-linked via the client-id attribute.
    #[tracing::instrument(skip(self), fields(cpf = %cpf))]
    pub async fn authenticate(&self, cpf: &str) -> Result<String, AuthError> {
        if cpf.is_empty() {
            return Err(AuthError::InvalidCpf);
        }

        let client_id = match self.directory.find_by_cpf(cpf).await? {
            Some(record) => record.id,
            None => {
                let name = format!("name-{}", Uuid::new_v4());
                let record = self.directory.create_client(cpf, &name).await?;

                let mut attrs = AccountAttributes::new();
                attrs.insert(ATTR_CPF.to_string(), cpf.to_string());
                attrs.insert(ATTR_CLIENT_ID.to_string(), record.id.to_string());
                self.identity
                    .provision_account(cpf, attrs)
                    .await
                    .map_err(AuthError::Provision)?;

                tracing::info!(client_id = record.id, "provisioned client and account");
                record.id
            }
        };

        Ok(self.tokens.issue(client_id, cpf, self.token_ttl)?)
    }

    /// Password login against the identity provider.
    ///
    /// Bad credentials and unknown accounts map to the same error so the
    /// endpoint cannot be used to enumerate usernames.
    #[tracing::instrument(skip(self, password), fields(cpf = %cpf))]
    pub async fn login(&self, cpf: &str, password: &str) -> Result<ProviderTokens, AuthError> {
        if cpf.is_empty() {
            return Err(AuthError::InvalidCpf);
        }
        match self.identity.login(cpf, password).await {
            Ok(tokens) => Ok(tokens),
            Err(ProviderError::Denied) | Err(ProviderError::NotFound) => Err(AuthError::Denied),
            Err(e) => Err(AuthError::Provider(e)),
        }
    }
}
