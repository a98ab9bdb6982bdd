//! Stateless bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs signed with a shared symmetric secret. They carry
//! the linked client id and CPF plus an expiry, so verification needs no
//! server-side session state.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

use crate::error::TokenError;

/// Claim set embedded in issued tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccessClaims {
    pub client_id: i64,
    pub cpf: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and validates signed claim sets.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against validation-time now, with no grace
        // window.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for the given client binding, expiring `ttl` from now.
    pub fn issue(&self, client_id: i64, cpf: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = AccessClaims {
            client_id,
            cpf: cpf.to_string(),
            exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Validate a token and return its claims.
    ///
    /// The signature is verified before any embedded value, including the
    /// expiry, is trusted.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
    }
}
