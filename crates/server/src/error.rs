use thiserror::Error;

use crate::saga::SagaState;

/// Failures reported by the identity provider boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("account already exists")]
    AlreadyExists,
    #[error("request rejected by identity provider: {0}")]
    Rejected(String),
    #[error("account not found")]
    NotFound,
    #[error("credentials rejected")]
    Denied,
    #[error("identity provider unreachable: {0}")]
    Unavailable(String),
    #[error("identity provider returned HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },
}

/// Failures reported by the order service's client registry boundary.
///
/// A definitive "no such client" is *not* an error: lookups return
/// `Ok(None)` for that case, so callers never confuse a missing record
/// with a broken service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("client record already exists")]
    Conflict,
    #[error("order service unreachable: {0}")]
    Unavailable(String),
    #[error("order service returned HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("could not decode order service response: {0}")]
    Decode(String),
}

/// Terminal failures of the signup saga.
///
/// Variants after `IdentityCreation` carry the rollback outcome: the saga
/// already created remote state and ran its compensation stack before
/// reporting. `rollback` is `RolledBack` when the compensating delete
/// succeeded and `FailedIrrecoverable` when it did not (the orphaned
/// identity is logged, never retried).
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("cpf must not be empty")]
    InvalidCpf,
    #[error("identity creation failed: {0}")]
    IdentityCreation(#[source] ProviderError),
    #[error("account confirmation failed: {source}")]
    Confirmation {
        source: ProviderError,
        rollback: SagaState,
    },
    #[error("client record resolution failed: {source}")]
    ResourceLink {
        source: DirectoryError,
        rollback: SagaState,
    },
    #[error("persisting client link failed: {source}")]
    LinkPersist {
        source: ProviderError,
        rollback: SagaState,
    },
}

impl SignupError {
    /// The saga state the orchestration ended in.
    pub fn saga_state(&self) -> SagaState {
        match self {
            SignupError::InvalidCpf | SignupError::IdentityCreation(_) => SagaState::Started,
            SignupError::Confirmation { rollback, .. }
            | SignupError::ResourceLink { rollback, .. }
            | SignupError::LinkPersist { rollback, .. } => *rollback,
        }
    }
}

/// Failures of token issuance and validation.
///
/// The API layer collapses every validation variant into a uniform 401 so
/// forgery attempts learn nothing from the response; the distinction only
/// exists for logs and tests.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Creation(String),
}

/// Failures of the authenticate/login flows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("cpf must not be empty")]
    InvalidCpf,
    #[error("client lookup failed: {0}")]
    Directory(#[from] DirectoryError),
    #[error("account provisioning failed: {0}")]
    Provision(#[source] ProviderError),
    #[error("credentials rejected")]
    Denied,
    #[error("identity provider error: {0}")]
    Provider(#[source] ProviderError),
    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),
}
