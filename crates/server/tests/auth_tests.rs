//! Authenticate/login flow behavior against recording fakes.

mod common;

use std::sync::Arc;

use account_gateway::auth::AuthOrchestrator;
use account_gateway::error::AuthError;
use account_gateway::identity::{ATTR_CLIENT_ID, ATTR_CPF};
use account_gateway::token::TokenCodec;
use common::{Lookup, RecordingIdentity, ScriptedDirectory, client_record};
use time::Duration;

const CPF: &str = "12345678900";
const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

fn orchestrator(
    identity: RecordingIdentity,
    directory: ScriptedDirectory,
) -> (
    AuthOrchestrator<RecordingIdentity, ScriptedDirectory>,
    Arc<RecordingIdentity>,
    Arc<ScriptedDirectory>,
    Arc<TokenCodec>,
) {
    let identity = Arc::new(identity);
    let directory = Arc::new(directory);
    let tokens = Arc::new(TokenCodec::new(SECRET));
    (
        AuthOrchestrator::new(
            identity.clone(),
            directory.clone(),
            tokens.clone(),
            Duration::hours(1),
        ),
        identity,
        directory,
        tokens,
    )
}

#[tokio::test]
async fn authenticate_reuses_existing_client() {
    let directory = ScriptedDirectory {
        lookup: Lookup::Found(client_record(7, CPF)),
        ..Default::default()
    };
    let (auth, identity, directory, tokens) = orchestrator(RecordingIdentity::default(), directory);

    let token = auth.authenticate(CPF).await.expect("token issued");

    let claims = tokens.validate(&token).expect("token valid");
    assert_eq!(claims.client_id, 7);
    assert_eq!(claims.cpf, CPF);
    assert!(directory.created().is_empty());
    assert_eq!(identity.count("provision"), 0);
}

#[tokio::test]
async fn authenticate_creates_and_provisions_when_absent() {
    let (auth, identity, directory, tokens) =
        orchestrator(RecordingIdentity::default(), ScriptedDirectory::default());

    let token = auth.authenticate(CPF).await.expect("token issued");

    let claims = tokens.validate(&token).expect("token valid");
    assert_eq!(claims.client_id, 42);

    let created = directory.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, CPF);
    assert!(
        created[0].1.starts_with("name-"),
        "placeholder display name expected, got {}",
        created[0].1
    );

    // The provisioned account is pre-linked to the new record.
    assert_eq!(identity.count("provision"), 1);
    let attrs = identity.attributes();
    assert_eq!(attrs.get(ATTR_CLIENT_ID).map(String::as_str), Some("42"));
    assert_eq!(attrs.get(ATTR_CPF).map(String::as_str), Some(CPF));
}

#[tokio::test]
async fn authenticate_surfaces_broken_directory() {
    let directory = ScriptedDirectory {
        lookup: Lookup::Broken,
        ..Default::default()
    };
    let (auth, identity, directory, _) = orchestrator(RecordingIdentity::default(), directory);

    let err = auth.authenticate(CPF).await.unwrap_err();

    assert!(matches!(err, AuthError::Directory(_)));
    assert!(directory.created().is_empty());
    assert_eq!(identity.count("provision"), 0);
}

#[tokio::test]
async fn authenticate_surfaces_provision_failure() {
    let identity = RecordingIdentity {
        fail_provision: true,
        ..Default::default()
    };
    let (auth, _, directory, _) = orchestrator(identity, ScriptedDirectory::default());

    let err = auth.authenticate(CPF).await.unwrap_err();

    assert!(matches!(err, AuthError::Provision(_)));
    // The created client record is accepted residue, not compensated.
    assert_eq!(directory.created().len(), 1);
}

#[tokio::test]
async fn authenticate_rejects_empty_cpf() {
    let (auth, _, directory, _) =
        orchestrator(RecordingIdentity::default(), ScriptedDirectory::default());
    assert!(matches!(
        auth.authenticate("").await,
        Err(AuthError::InvalidCpf)
    ));
    assert_eq!(directory.lookups(), 0);
}

#[tokio::test]
async fn login_passes_provider_tokens_through() {
    let (auth, identity, _, _) =
        orchestrator(RecordingIdentity::default(), ScriptedDirectory::default());

    let tokens = auth.login(CPF, "secret1").await.expect("login succeeds");

    assert_eq!(tokens.access_token, "access");
    assert_eq!(tokens.refresh_token, "refresh");
    assert_eq!(identity.count("login"), 1);
}

#[tokio::test]
async fn login_denial_is_uniform() {
    let identity = RecordingIdentity {
        deny_login: true,
        ..Default::default()
    };
    let (auth, _, _, _) = orchestrator(identity, ScriptedDirectory::default());

    assert!(matches!(
        auth.login(CPF, "wrong").await,
        Err(AuthError::Denied)
    ));
}
