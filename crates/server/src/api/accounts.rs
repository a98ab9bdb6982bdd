//! Signup and authentication endpoints.
//!
//! - `/signup` - run the signup saga for a CPF + password
//! - `/token`  - trusted-caller path: resolve-or-create a client, mint a token
//! - `/login`  - password login against the identity provider
//! - `/me`     - introspect the bearer token from the Authorization header

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::auth::{ApiError, Bearer};
use crate::auth::AuthOrchestrator;
use crate::directory::ClientDirectory;
use crate::identity::{IdentityProvider, ProviderTokens};
use crate::saga::{self, SignupOrchestrator};
use crate::token::AccessClaims;

/// Tag for OpenAPI documentation.
pub const ACCOUNTS_TAG: &str = "Accounts API";

/// Shared state for account endpoints.
pub struct AppState<I, C> {
    pub signup: Arc<SignupOrchestrator<I, C>>,
    pub auth: Arc<AuthOrchestrator<I, C>>,
}

impl<I, C> Clone for AppState<I, C> {
    fn clone(&self) -> Self {
        Self {
            signup: self.signup.clone(),
            auth: self.auth.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub cpf: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub client_id: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub cpf: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}

/// Creates the accounts API router.
#[tracing::instrument(skip(state))]
pub fn router<I, C>(state: AppState<I, C>) -> OpenApiRouter
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    OpenApiRouter::new()
        .routes(routes!(post_signup))
        .routes(routes!(post_token))
        .routes(routes!(post_login))
        .routes(routes!(get_me))
        .with_state(state)
}

#[tracing::instrument(skip(state, payload), fields(cpf = %payload.cpf))]
#[utoipa::path(
    post,
    path = "/signup",
    tag = ACCOUNTS_TAG,
    operation_id = "Signup",
    summary = "Provision an account and link it to a client record",
    description = "Creates an identity with the given CPF and password, confirms it, \
                   resolves (or creates) the matching client record in the order service, \
                   and links the two. If any step after identity creation fails, the \
                   identity is deleted again so signup can be retried.",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created and linked", body = SignupResponse),
        (status = 400, description = "Malformed input", body = ApiError),
        (status = 409, description = "Account or client record already exists", body = ApiError),
        (status = 502, description = "An external system is unreachable", body = ApiError),
        (status = 500, description = "Signup failed at a later saga step", body = ApiError)
    )
)]
async fn post_signup<I, C>(
    State(state): State<AppState<I, C>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError>
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    match state.signup.signup(&payload.cpf, &payload.password).await {
        Ok(outcome) => Ok(Json(SignupResponse {
            client_id: outcome.client_id,
        })),
        Err(err) => {
            tracing::error!(
                error = %err,
                saga_state = ?err.saga_state(),
                retryable = saga::is_retryable(&err),
                "signup failed"
            );
            Err(err.into())
        }
    }
}

#[tracing::instrument(skip(state, payload), fields(cpf = %payload.cpf))]
#[utoipa::path(
    post,
    path = "/token",
    tag = ACCOUNTS_TAG,
    operation_id = "Mint Token",
    summary = "Mint a gateway token for a CPF (trusted-caller path)",
    description = "Resolves the client record for the CPF, creating it (plus a \
                   password-less provider account) when absent, then returns a signed \
                   bearer token carrying the client id. No credential check happens \
                   here; the endpoint is meant to sit behind a trusted gateway.",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed input", body = ApiError),
        (status = 502, description = "An external system is unreachable", body = ApiError),
        (status = 500, description = "Token could not be issued", body = ApiError)
    )
)]
async fn post_token<I, C>(
    State(state): State<AppState<I, C>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError>
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    match state.auth.authenticate(&payload.cpf).await {
        Ok(token) => Ok(Json(TokenResponse { token })),
        Err(err) => {
            tracing::error!(error = %err, "token minting failed");
            Err(err.into())
        }
    }
}

#[tracing::instrument(skip(state, payload), fields(cpf = %payload.cpf))]
#[utoipa::path(
    post,
    path = "/login",
    tag = ACCOUNTS_TAG,
    operation_id = "Login",
    summary = "Password login",
    description = "Forwards the credentials to the identity provider's password flow \
                   and returns its token triple. Credential failures are reported \
                   uniformly as 401.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = ProviderTokens),
        (status = 401, description = "Credentials rejected", body = ApiError),
        (status = 502, description = "Identity provider unreachable", body = ApiError)
    )
)]
async fn post_login<I, C>(
    State(state): State<AppState<I, C>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ProviderTokens>, ApiError>
where
    I: IdentityProvider + 'static,
    C: ClientDirectory + 'static,
{
    match state.auth.login(&payload.cpf, &payload.password).await {
        Ok(tokens) => Ok(Json(tokens)),
        Err(err) => {
            // Credential failures stay at debug: they are expected traffic.
            tracing::debug!(error = %err, "login rejected");
            Err(err.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/me",
    tag = ACCOUNTS_TAG,
    operation_id = "Introspect Token",
    summary = "Decode the presented bearer token",
    description = "Returns the claim set of the token in the Authorization header. \
                   Any validation failure yields the same 401 response.",
    responses(
        (status = 200, description = "Decoded claims", body = AccessClaims),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    )
)]
async fn get_me(Bearer(claims): Bearer) -> Json<AccessClaims> {
    Json(claims)
}
