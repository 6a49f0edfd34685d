use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::types::User;
use crate::validation::normalize_email;

/// The identity service that owns user accounts. Only verified accounts may vote.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_verified(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Users loaded once from a JSON array such as `[{"email": "...", "isVerified": true}]`.
#[derive(Debug, Default)]
pub struct JsonUserDirectory {
    users: HashMap<String, User>,
}

impl JsonUserDirectory {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (normalize_email(&user.email), user))
            .collect();
        Self { users }
    }

    /// A missing file yields an empty directory, so nobody can vote until users are provisioned.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Users file {} not found, upvoting is disabled", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let users: Vec<User> = serde_json::from_str(&content)?;
        info!("Loaded {} users from {}", users.len(), path.display());
        Ok(Self::from_users(users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    async fn find_verified(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .get(&normalize_email(email))
            .filter(|user| user.is_verified)
            .cloned())
    }
}
