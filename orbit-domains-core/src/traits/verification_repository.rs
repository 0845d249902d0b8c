//! Verification persistence abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::DomainVerification;

/// Persistence for domain ownership verifications.
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Insert or replace a verification by id.
    async fn save(&self, verification: &DomainVerification) -> CoreResult<()>;

    /// Fetch a verification by id.
    async fn get(&self, id: &str) -> CoreResult<Option<DomainVerification>>;

    /// All verifications belonging to a user.
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<DomainVerification>>;

    /// All verifications for a domain, across users.
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Vec<DomainVerification>>;

    /// Delete a verification. Returns `false` when the id was unknown.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}

/// In-memory verification repository for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryVerificationRepository {
    verifications: Arc<RwLock<HashMap<String, DomainVerification>>>,
}

impl InMemoryVerificationRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn save(&self, verification: &DomainVerification) -> CoreResult<()> {
        self.verifications
            .write()
            .await
            .insert(verification.id.clone(), verification.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<DomainVerification>> {
        Ok(self.verifications.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<DomainVerification>> {
        let verifications = self.verifications.read().await;
        let mut found: Vec<DomainVerification> = verifications
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn find_by_domain(&self, domain: &str) -> CoreResult<Vec<DomainVerification>> {
        let verifications = self.verifications.read().await;
        let mut found: Vec<DomainVerification> = verifications
            .values()
            .filter(|v| v.domain == domain)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.verifications.write().await.remove(id).is_some())
    }
}
