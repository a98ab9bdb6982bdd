//! Client registry boundary (order service).
//!
//! The order service owns client records; the gateway only resolves or
//! creates them by CPF and otherwise treats them as opaque remote entities.

use std::future::Future;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::DirectoryError;

/// A client record as returned by the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    /// Creation timestamp in whatever format the order service emits;
    /// carried through untouched.
    pub created_at: String,
}

/// Capability interface to the order service's client registry.
pub trait ClientDirectory: Send + Sync {
    /// Look up a client record by CPF.
    ///
    /// `Ok(None)` means the service definitively reported "no such client"
    /// (HTTP 404). Any other non-success outcome is an `Err`; collapsing
    /// the two would make the signup saga create records against a broken
    /// service, or bail when it should create.
    fn find_by_cpf(
        &self,
        cpf: &str,
    ) -> impl Future<Output = Result<Option<ClientRecord>, DirectoryError>> + Send;

    /// Create a client record for the given CPF.
    fn create_client(
        &self,
        cpf: &str,
        name: &str,
    ) -> impl Future<Output = Result<ClientRecord, DirectoryError>> + Send;
}

/// Client registry backed by the order service's REST API.
#[derive(Clone)]
pub struct HttpClientDirectory {
    client: Client,
    base_url: String,
}

impl HttpClientDirectory {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url.trim_end_matches('/'))
    }

    async fn upstream(resp: reqwest::Response) -> DirectoryError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let detail = body.trim().chars().take(200).collect::<String>();
        DirectoryError::Upstream { status, detail }
    }
}

impl ClientDirectory for HttpClientDirectory {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<ClientRecord>, DirectoryError> {
        let resp = self
            .client
            .get(self.url(&format!("/clients/{cpf}")))
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => resp
                .json::<ClientRecord>()
                .await
                .map(Some)
                .map_err(|e| DirectoryError::Decode(e.to_string())),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn create_client(&self, cpf: &str, name: &str) -> Result<ClientRecord, DirectoryError> {
        let resp = self
            .client
            .post(self.url("/clients"))
            .json(&json!({ "cpf": cpf, "name": name }))
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        match resp.status() {
            StatusCode::CREATED | StatusCode::OK => resp
                .json::<ClientRecord>()
                .await
                .map_err(|e| DirectoryError::Decode(e.to_string())),
            StatusCode::CONFLICT => Err(DirectoryError::Conflict),
            _ => Err(Self::upstream(resp).await),
        }
    }
}
