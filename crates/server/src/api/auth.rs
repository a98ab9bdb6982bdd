//! API error responses and the bearer-token extractor.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppResources;
use crate::error::{AuthError, DirectoryError, ProviderError, SignupError};
use crate::token::AccessClaims;

/// JSON error body returned by every endpoint.
///
/// Upstream error detail is logged, never echoed: the message is a short
/// fixed description of the failing boundary.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Uniform credential/token failure. Deliberately detail-free.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn provider_failure(e: &ProviderError, fallback: &str) -> ApiError {
    match e {
        ProviderError::AlreadyExists => ApiError::conflict("account already exists"),
        ProviderError::Rejected(_) => ApiError::conflict("rejected by identity provider"),
        ProviderError::Unavailable(_) => ApiError::bad_gateway("identity provider unreachable"),
        _ => ApiError::internal(fallback),
    }
}

fn directory_failure(e: &DirectoryError, fallback: &str) -> ApiError {
    match e {
        DirectoryError::Conflict => ApiError::conflict("client record already exists"),
        DirectoryError::Unavailable(_) => ApiError::bad_gateway("order service unreachable"),
        _ => ApiError::internal(fallback),
    }
}

impl From<SignupError> for ApiError {
    fn from(err: SignupError) -> Self {
        match &err {
            SignupError::InvalidCpf => ApiError::bad_request("cpf must not be empty"),
            SignupError::IdentityCreation(e) => provider_failure(e, "could not create account"),
            SignupError::Confirmation { source, .. } => {
                provider_failure(source, "could not confirm account")
            }
            SignupError::ResourceLink { source, .. } => {
                directory_failure(source, "could not resolve client record")
            }
            SignupError::LinkPersist { source, .. } => {
                provider_failure(source, "could not link client record")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::InvalidCpf => ApiError::bad_request("cpf must not be empty"),
            AuthError::Denied => ApiError::unauthorized(),
            AuthError::Directory(e) => directory_failure(e, "could not resolve client record"),
            AuthError::Provision(e) => provider_failure(e, "could not provision account"),
            AuthError::Provider(e) => provider_failure(e, "identity provider error"),
            AuthError::Token(_) => ApiError::internal("could not issue token"),
        }
    }
}

/// Axum extractor validating `Authorization: Bearer <token>` against the
/// gateway's token codec.
///
/// Every failure (missing header, wrong scheme, malformed token, bad
/// signature, expired) yields the same 401 body; the distinction is logged
/// at debug level only.
pub struct Bearer(pub AccessClaims);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AppResources not found in extensions");
                ApiError::internal("server misconfigured")
            })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) => header.strip_prefix("Bearer ").unwrap_or(header),
            None => {
                tracing::debug!("missing authorization header");
                return Err(ApiError::unauthorized());
            }
        };

        match resources.tokens.validate(token) {
            Ok(claims) => Ok(Bearer(claims)),
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                Err(ApiError::unauthorized())
            }
        }
    }
}
