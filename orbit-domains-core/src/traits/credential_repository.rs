//! Credential persistence abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::StoredCredential;

/// Persistence for stored credentials.
///
/// Implementations receive `secrets` already sealed; they never see
/// plaintext secret material.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert or replace a credential by id.
    async fn save(&self, credential: &StoredCredential) -> CoreResult<()>;

    /// Fetch a credential by id.
    async fn get(&self, id: &str) -> CoreResult<Option<StoredCredential>>;

    /// All credentials belonging to a user.
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<StoredCredential>>;

    /// Delete a credential. Returns `false` when the id was unknown.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}

/// In-memory credential repository for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryCredentialRepository {
    credentials: Arc<RwLock<HashMap<String, StoredCredential>>>,
}

impl InMemoryCredentialRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn save(&self, credential: &StoredCredential) -> CoreResult<()> {
        self.credentials
            .write()
            .await
            .insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<StoredCredential>> {
        Ok(self.credentials.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<StoredCredential>> {
        let credentials = self.credentials.read().await;
        let mut found: Vec<StoredCredential> = credentials
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.credentials.write().await.remove(id).is_some())
    }
}
