//! In-memory fakes for the two external boundaries, recording every call so
//! tests can assert exactly which remote side effects an orchestration run
//! produced.

#![allow(dead_code)]

use std::sync::Mutex;

use account_gateway::directory::{ClientDirectory, ClientRecord};
use account_gateway::error::{DirectoryError, ProviderError};
use account_gateway::identity::{AccountAttributes, IdentityProvider, ProviderTokens};

/// Identity provider fake. Failure toggles make the matching operation
/// return a canned upstream error; every call is recorded as
/// `"<op>:<username>"`.
#[derive(Default)]
pub struct RecordingIdentity {
    pub fail_create: bool,
    /// Like `fail_create`, but with the provider's duplicate-account answer.
    pub duplicate_create: bool,
    pub fail_confirm: bool,
    pub fail_update: bool,
    pub fail_delete: bool,
    pub fail_provision: bool,
    pub deny_login: bool,
    pub calls: Mutex<Vec<String>>,
    pub attributes: Mutex<AccountAttributes>,
}

impl RecordingIdentity {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        let prefix = format!("{op}:");
        self.calls()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    pub fn attributes(&self) -> AccountAttributes {
        self.attributes.lock().unwrap().clone()
    }

    fn record(&self, op: &str, username: &str) {
        self.calls.lock().unwrap().push(format!("{op}:{username}"));
    }

    fn upstream(detail: &str) -> ProviderError {
        ProviderError::Upstream {
            status: 500,
            detail: detail.into(),
        }
    }
}

impl IdentityProvider for RecordingIdentity {
    async fn create_account(
        &self,
        username: &str,
        _password: &str,
        attrs: AccountAttributes,
    ) -> Result<String, ProviderError> {
        self.record("create", username);
        if self.duplicate_create {
            return Err(ProviderError::AlreadyExists);
        }
        if self.fail_create {
            return Err(Self::upstream("create refused"));
        }
        self.attributes.lock().unwrap().extend(attrs);
        Ok(format!("sub-{username}"))
    }

    async fn provision_account(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> Result<String, ProviderError> {
        self.record("provision", username);
        if self.fail_provision {
            return Err(Self::upstream("provision refused"));
        }
        self.attributes.lock().unwrap().extend(attrs);
        Ok(format!("sub-{username}"))
    }

    async fn confirm_account(&self, username: &str) -> Result<(), ProviderError> {
        self.record("confirm", username);
        if self.fail_confirm {
            return Err(Self::upstream("confirm refused"));
        }
        Ok(())
    }

    async fn get_attributes(&self, username: &str) -> Result<AccountAttributes, ProviderError> {
        self.record("get", username);
        Ok(self.attributes())
    }

    async fn update_attributes(
        &self,
        username: &str,
        attrs: AccountAttributes,
    ) -> Result<(), ProviderError> {
        self.record("update", username);
        if self.fail_update {
            return Err(Self::upstream("update refused"));
        }
        self.attributes.lock().unwrap().extend(attrs);
        Ok(())
    }

    async fn delete_account(&self, username: &str) -> Result<(), ProviderError> {
        self.record("delete", username);
        if self.fail_delete {
            return Err(ProviderError::Unavailable("delete timed out".into()));
        }
        Ok(())
    }

    async fn login(&self, username: &str, _password: &str) -> Result<ProviderTokens, ProviderError> {
        self.record("login", username);
        if self.deny_login {
            return Err(ProviderError::Denied);
        }
        Ok(ProviderTokens {
            access_token: "access".into(),
            id_token: "id".into(),
            refresh_token: "refresh".into(),
        })
    }
}

/// What the directory fake answers to lookups.
pub enum Lookup {
    Found(ClientRecord),
    Missing,
    /// The service is up but broken (a non-404 failure).
    Broken,
}

/// Client registry fake with a scripted lookup answer.
pub struct ScriptedDirectory {
    pub lookup: Lookup,
    pub fail_create: bool,
    /// Id assigned to a record created through this fake.
    pub next_id: i64,
    pub lookups: Mutex<usize>,
    pub created: Mutex<Vec<(String, String)>>,
}

impl Default for ScriptedDirectory {
    fn default() -> Self {
        Self {
            lookup: Lookup::Missing,
            fail_create: false,
            next_id: 42,
            lookups: Mutex::new(0),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedDirectory {
    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

pub fn client_record(id: i64, cpf: &str) -> ClientRecord {
    ClientRecord {
        id,
        name: format!("name-{id}"),
        cpf: cpf.to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

impl ClientDirectory for ScriptedDirectory {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<ClientRecord>, DirectoryError> {
        *self.lookups.lock().unwrap() += 1;
        match &self.lookup {
            Lookup::Found(record) => Ok(Some(record.clone())),
            Lookup::Missing => Ok(None),
            Lookup::Broken => Err(DirectoryError::Upstream {
                status: 500,
                detail: format!("lookup for {cpf} exploded"),
            }),
        }
    }

    async fn create_client(&self, cpf: &str, name: &str) -> Result<ClientRecord, DirectoryError> {
        self.created
            .lock()
            .unwrap()
            .push((cpf.to_string(), name.to_string()));
        if self.fail_create {
            return Err(DirectoryError::Upstream {
                status: 500,
                detail: "create refused".into(),
            });
        }
        Ok(ClientRecord {
            id: self.next_id,
            name: name.to_string(),
            cpf: cpf.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        })
    }
}
