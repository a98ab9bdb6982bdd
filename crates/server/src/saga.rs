//! Signup saga.
//!
//! Signup spans two independent, non-transactional systems: the identity
//! provider and the order service's client registry. Neither enforces the
//! cross-store invariant (a linked identity must point at an existing client
//! record), so the orchestrator does, by running the steps strictly in
//! sequence and unwinding committed remote state when a later step fails.
//!
//! Compensation is best-effort and single-attempt: actions are pushed onto a
//! stack as steps commit and executed in reverse on the first failure. A
//! failed compensating call is logged and reflected in the terminal
//! [`SagaState`], but never changes which error the caller sees.
//!
//! Client-record creation is not compensated: a record without an identity
//! is reused by the next signup or auth call for the same CPF, while an
//! orphaned identity would block re-signup.

use std::sync::Arc;

use crate::directory::ClientDirectory;
use crate::error::{ProviderError, SignupError};
use crate::identity::{ATTR_CLIENT_ID, ATTR_CPF, AccountAttributes, IdentityProvider};

/// Progress marker for one orchestration run. Transient; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Started,
    IdentityCreated,
    IdentityConfirmed,
    ResourceLinked,
    Completed,
    RolledBack,
    FailedIrrecoverable,
}

/// A committed remote step that must be undone if the saga fails later.
#[derive(Debug)]
enum Compensation {
    DeleteAccount { username: String },
}

/// Result of a completed signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub client_id: i64,
}

/// Drives the signup saga against the two external boundaries.
pub struct SignupOrchestrator<I, C> {
    identity: Arc<I>,
    directory: Arc<C>,
}

impl<I, C> SignupOrchestrator<I, C>
where
    I: IdentityProvider,
    C: ClientDirectory,
{
    pub fn new(identity: Arc<I>, directory: Arc<C>) -> Self {
        Self {
            identity,
            directory,
        }
    }

    /// Run the full signup saga for `cpf`.
    ///
    /// On success the identity exists, is confirmed, and carries the linked
    /// client id in its attribute map. On failure no identity created by
    /// this run survives (unless the compensating delete itself failed,
    /// which the returned error records as `FailedIrrecoverable`).
    #[tracing::instrument(skip(self, password), fields(cpf = %cpf))]
    pub async fn signup(&self, cpf: &str, password: &str) -> Result<SignupOutcome, SignupError> {
        if cpf.is_empty() {
            return Err(SignupError::InvalidCpf);
        }

        let mut compensations: Vec<Compensation> = Vec::new();
        let mut state = SagaState::Started;
        tracing::debug!(?state, "signup saga started");

        // Step 1: create the identity. Nothing to compensate if this fails.
        let mut attrs = AccountAttributes::new();
        attrs.insert(ATTR_CPF.to_string(), cpf.to_string());
        let subject = self
            .identity
            .create_account(cpf, password, attrs)
            .await
            .map_err(SignupError::IdentityCreation)?;
        compensations.push(Compensation::DeleteAccount {
            username: cpf.to_string(),
        });
        state = SagaState::IdentityCreated;
        tracing::debug!(?state, %subject, "identity created");

        // Step 2: administratively confirm, bypassing the out-of-band
        // confirmation channel.
        if let Err(source) = self.identity.confirm_account(cpf).await {
            let rollback = self.run_compensations(compensations).await;
            return Err(SignupError::Confirmation { source, rollback });
        }
        state = SagaState::IdentityConfirmed;
        tracing::debug!(?state, "identity confirmed");

        // Step 3: resolve the client record. A definitive "not found" drives
        // creation; anything else aborts without attempting to create.
        let record = match self.directory.find_by_cpf(cpf).await {
            Ok(Some(record)) => record,
            Ok(None) => match self.directory.create_client(cpf, cpf).await {
                Ok(record) => record,
                Err(source) => {
                    let rollback = self.run_compensations(compensations).await;
                    return Err(SignupError::ResourceLink { source, rollback });
                }
            },
            Err(source) => {
                let rollback = self.run_compensations(compensations).await;
                return Err(SignupError::ResourceLink { source, rollback });
            }
        };
        state = SagaState::ResourceLinked;
        tracing::debug!(?state, client_id = record.id, "client record resolved");

        // Step 4: write the link back onto the identity.
        let mut link = AccountAttributes::new();
        link.insert(ATTR_CLIENT_ID.to_string(), record.id.to_string());
        if let Err(source) = self.identity.update_attributes(cpf, link).await {
            let rollback = self.run_compensations(compensations).await;
            return Err(SignupError::LinkPersist { source, rollback });
        }

        state = SagaState::Completed;
        tracing::info!(?state, client_id = record.id, "signup completed");
        Ok(SignupOutcome {
            client_id: record.id,
        })
    }

    /// Execute accumulated compensations in reverse order, single attempt
    /// each. Returns the terminal state of the rollback.
    async fn run_compensations(&self, mut compensations: Vec<Compensation>) -> SagaState {
        let mut state = SagaState::RolledBack;
        while let Some(action) = compensations.pop() {
            match action {
                Compensation::DeleteAccount { username } => {
                    if let Err(e) = self.identity.delete_account(&username).await {
                        tracing::warn!(
                            %username,
                            error = %e,
                            "compensating delete failed; identity may be orphaned"
                        );
                        state = SagaState::FailedIrrecoverable;
                    } else {
                        tracing::debug!(%username, "compensating delete succeeded");
                    }
                }
            }
        }
        state
    }
}

/// Marker for errors the caller could meaningfully resubmit after.
pub fn is_retryable(err: &SignupError) -> bool {
    match err {
        SignupError::IdentityCreation(e) | SignupError::LinkPersist { source: e, .. } => {
            matches!(e, ProviderError::Unavailable(_))
        }
        SignupError::Confirmation { source, .. } => {
            matches!(source, ProviderError::Unavailable(_))
        }
        SignupError::ResourceLink { source, .. } => {
            matches!(source, crate::error::DirectoryError::Unavailable(_))
        }
        SignupError::InvalidCpf => false,
    }
}
