//! Transfer persistence abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::types::{DomainTransfer, TransferStatus};

/// Persistence for domain transfers.
#[async_trait]
pub trait TransferRepository: Send + Sync {
    /// Insert or replace a transfer by id.
    async fn save(&self, transfer: &DomainTransfer) -> CoreResult<()>;

    /// Fetch a transfer by id.
    async fn get(&self, id: &str) -> CoreResult<Option<DomainTransfer>>;

    /// All transfers belonging to a user.
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<DomainTransfer>>;

    /// All transfers for a domain, across users.
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Vec<DomainTransfer>>;

    /// Conditional write: persist `transfer` only while the stored row is
    /// still in `expected` status.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TransferNotFound`] when the id is unknown and
    /// [`CoreError::ConcurrentModification`] when the stored status no
    /// longer matches `expected`.
    async fn update_if_status(
        &self,
        transfer: &DomainTransfer,
        expected: TransferStatus,
    ) -> CoreResult<()>;

    /// Delete a transfer. Returns `false` when the id was unknown.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}

/// In-memory transfer repository for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryTransferRepository {
    transfers: Arc<RwLock<HashMap<String, DomainTransfer>>>,
}

impl InMemoryTransferRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferRepository for InMemoryTransferRepository {
    async fn save(&self, transfer: &DomainTransfer) -> CoreResult<()> {
        self.transfers
            .write()
            .await
            .insert(transfer.id.clone(), transfer.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<DomainTransfer>> {
        Ok(self.transfers.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<DomainTransfer>> {
        let transfers = self.transfers.read().await;
        let mut found: Vec<DomainTransfer> = transfers
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn find_by_domain(&self, domain: &str) -> CoreResult<Vec<DomainTransfer>> {
        let transfers = self.transfers.read().await;
        let mut found: Vec<DomainTransfer> = transfers
            .values()
            .filter(|t| t.domain == domain)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn update_if_status(
        &self,
        transfer: &DomainTransfer,
        expected: TransferStatus,
    ) -> CoreResult<()> {
        let mut transfers = self.transfers.write().await;
        let Some(stored) = transfers.get(&transfer.id) else {
            return Err(CoreError::TransferNotFound(transfer.id.clone()));
        };
        if stored.status != expected {
            return Err(CoreError::ConcurrentModification(format!(
                "transfer {} is {}, expected {expected}",
                transfer.id, stored.status
            )));
        }
        transfers.insert(transfer.id.clone(), transfer.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.transfers.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{TransferSource, VerificationMethod};

    fn transfer(id: &str, status: TransferStatus) -> DomainTransfer {
        DomainTransfer {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            domain: "example.com".to_string(),
            source: TransferSource::Wix,
            verification_token: "tok".to_string(),
            verification_method: VerificationMethod::DnsTxt,
            source_credential_id: None,
            target_credential_id: None,
            status,
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn conditional_update_detects_races() {
        let repo = InMemoryTransferRepository::new();
        let initial = transfer("t1", TransferStatus::Initiated);
        repo.save(&initial).await.unwrap();

        let mut advanced = initial.clone();
        advanced.status = TransferStatus::OwnershipVerified;
        repo.update_if_status(&advanced, TransferStatus::Initiated)
            .await
            .unwrap();

        // A second writer still expecting INITIATED must lose.
        let result = repo
            .update_if_status(&advanced, TransferStatus::Initiated)
            .await;
        assert!(matches!(
            result,
            Err(CoreError::ConcurrentModification(_))
        ));
    }

    #[tokio::test]
    async fn conditional_update_unknown_id() {
        let repo = InMemoryTransferRepository::new();
        let result = repo
            .update_if_status(
                &transfer("missing", TransferStatus::Initiated),
                TransferStatus::Initiated,
            )
            .await;
        assert!(matches!(result, Err(CoreError::TransferNotFound(_))));
    }
}
