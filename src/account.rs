//! Account creation collaborator.
//!
//! Validation hands a [`NewAccount`] to an [`AccountCreator`]; how it is
//! persisted is up to the implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::validation::NewAccount;

pub type Result<T> = std::result::Result<T, AccountError>;

/// Errors reported by an [`AccountCreator`].
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("an account already exists for this email")]
    AlreadyExists,
    #[error("account storage failed: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// A created account, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
}

/// Port for account creation.
#[async_trait]
pub trait AccountCreator: Send + Sync {
    /// Store a validated account.
    async fn create(&self, account: NewAccount) -> Result<Account>;
}

/// Volatile [`AccountCreator`] keyed by lowercased email.
#[derive(Debug, Default)]
pub struct MemoryAccounts {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountCreator for MemoryAccounts {
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let key = account.email.to_lowercase();
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&key) {
            return Err(AccountError::AlreadyExists);
        }

        let created = Account {
            sub: Uuid::new_v4().to_string(),
            email: account.email,
            email_verified: account.email_verified,
        };
        accounts.insert(key, created.clone());

        Ok(created)
    }
}
