//! HTTP adapter for the identity provider's admin REST API.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::error::ProviderError;
use crate::identity::{AccountAttributes, IdentityProvider, ProviderTokens};

/// Identity provider client backed by `reqwest`.
///
/// Cheap to clone; the inner [`reqwest::Client`] shares its connection pool.
/// All admin operations are scoped to a single user pool.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    pool_id: String,
    client_id: String,
}

#[derive(Deserialize)]
struct CreatedAccount {
    subject: String,
}

impl HttpIdentityProvider {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            pool_id: pool_id.into(),
            client_id: client_id.into(),
        }
    }

    fn pool_url(&self, path: &str) -> String {
        format!(
            "{}/pools/{}{path}",
            self.base_url.trim_end_matches('/'),
            self.pool_id
        )
    }

    async fn subject_from(resp: Response) -> Result<String, ProviderError> {
        let status = resp.status().as_u16();
        resp.json::<CreatedAccount>()
            .await
            .map(|a| a.subject)
            .map_err(|e| ProviderError::Upstream {
                status,
                detail: format!("undecodable body: {e}"),
            })
    }

    async fn reject_detail(resp: Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let detail = body.trim();
        if detail.is_empty() {
            format!("HTTP {status}")
        } else {
            detail.chars().take(200).collect()
        }
    }

    async fn upstream(resp: Response) -> ProviderError {
        let status = resp.status().as_u16();
        let detail = Self::reject_detail(resp).await;
        ProviderError::Upstream { status, detail }
    }

    fn transport(e: reqwest::Error) -> ProviderError {
        ProviderError::Unavailable(e.to_string())
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(
        &self,
        username: &str,
        password: &str,
        attrs: AccountAttributes,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "username": username,
            "password": password,
            "client_id": self.client_id,
            "attributes": attrs,
        });
        let resp = self
            .client
            .post(self.pool_url("/accounts"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::CREATED | StatusCode::OK => Self::subject_from(resp).await,
            StatusCode::CONFLICT => Err(ProviderError::AlreadyExists),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ProviderError::Rejected(Self::reject_detail(resp).await))
            }
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn provision_account(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "client_id": self.client_id,
            "attributes": attrs,
        });
        let resp = self
            .client
            .post(self.pool_url(&format!("/accounts/{username}/provision")))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::CREATED | StatusCode::OK => Self::subject_from(resp).await,
            StatusCode::CONFLICT => Err(ProviderError::AlreadyExists),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ProviderError::Rejected(Self::reject_detail(resp).await))
            }
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn confirm_account(&self, username: &str) -> Result<(), ProviderError> {
        let resp = self
            .client
            .post(self.pool_url(&format!("/accounts/{username}/confirm")))
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn get_attributes(&self, username: &str) -> Result<AccountAttributes, ProviderError> {
        #[derive(Deserialize)]
        struct Account {
            attributes: AccountAttributes,
        }

        let resp = self
            .client
            .get(self.pool_url(&format!("/accounts/{username}")))
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::OK => {
                let status = resp.status().as_u16();
                resp.json::<Account>()
                    .await
                    .map(|a| a.attributes)
                    .map_err(|e| ProviderError::Upstream {
                        status,
                        detail: format!("undecodable body: {e}"),
                    })
            }
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn update_attributes(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> Result<(), ProviderError> {
        let resp = self
            .client
            .patch(self.pool_url(&format!("/accounts/{username}/attributes")))
            .json(&json!({ "attributes": attrs }))
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn delete_account(&self, username: &str) -> Result<(), ProviderError> {
        let resp = self
            .client
            .delete(self.pool_url(&format!("/accounts/{username}")))
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            // 404 counts as success: the compensating delete must not care
            // whether creation ever fully happened.
            StatusCode::NO_CONTENT | StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::upstream(resp).await),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<ProviderTokens, ProviderError> {
        let body = json!({
            "username": username,
            "password": password,
            "client_id": self.client_id,
        });
        let resp = self
            .client
            .post(self.pool_url("/login"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport)?;
        match resp.status() {
            StatusCode::OK => {
                let status = resp.status().as_u16();
                resp.json::<ProviderTokens>()
                    .await
                    .map_err(|e| ProviderError::Upstream {
                        status,
                        detail: format!("undecodable body: {e}"),
                    })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Denied),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            _ => Err(Self::upstream(resp).await),
        }
    }
}
