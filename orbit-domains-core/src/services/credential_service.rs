//! Credential vault service.
//!
//! Secrets are sealed before they reach the repository and only opened
//! for explicit decrypting reads and live vendor calls. Every mutation
//! and every decrypting read leaves an audit event.

use std::sync::Arc;

use chrono::Utc;
use orbit_domains_provider::{Provider, ProviderCredentials, ProviderType};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{AuditEvent, CreateCredentialRequest, StoredCredential, UpdateCredentialRequest};

use super::ServiceContext;

const RESOURCE: &str = "credential";

/// Credential vault operations.
pub struct CredentialService {
    ctx: Arc<ServiceContext>,
}

impl CredentialService {
    /// Create the service.
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Store a new credential. Secrets are sealed before persistence.
    ///
    /// Returns the stored credential with secrets redacted.
    pub async fn store_credential(
        &self,
        request: CreateCredentialRequest,
    ) -> CoreResult<StoredCredential> {
        if request.name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "credential name is required".to_string(),
            ));
        }
        if request.secrets.is_empty() {
            return Err(CoreError::ValidationError(
                "credential secrets must not be empty".to_string(),
            ));
        }
        if !request.provider.supports(request.provider_type) {
            return Err(CoreError::ValidationError(format!(
                "{} has no {} capability",
                request.provider, request.provider_type
            )));
        }

        let now = Utc::now();
        let credential = StoredCredential {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            provider: request.provider,
            provider_type: request.provider_type,
            credential_type: request.credential_type,
            name: request.name,
            secrets: self.ctx.cipher.seal_map(&request.secrets)?,
            encrypted: true,
            verified: false,
            created_at: now,
            updated_at: now,
            last_used_at: None,
        };

        self.ctx.credential_repository.save(&credential).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &credential.user_id,
                "credential.store",
                RESOURCE,
                &credential.id,
            ))
            .await;

        Ok(credential.redacted())
    }

    /// Fetch a credential.
    ///
    /// With `decrypt == false` the secrets come back redacted and the
    /// credential is untouched. With `decrypt == true` the plaintext is
    /// returned, `last_used_at` is bumped, and the read is audited.
    pub async fn get_credential(&self, id: &str, decrypt: bool) -> CoreResult<StoredCredential> {
        let mut credential = self.require(id).await?;

        if !decrypt {
            return Ok(credential.redacted());
        }

        let plaintext = match self.ctx.cipher.open_map(&credential.secrets) {
            Ok(map) => map,
            Err(e) => {
                self.ctx
                    .audit
                    .send(AuditEvent::failure(
                        &credential.user_id,
                        "credential.decrypt",
                        RESOURCE,
                        id,
                        &e.to_string(),
                    ))
                    .await;
                return Err(e);
            }
        };

        credential.last_used_at = Some(Utc::now());
        self.ctx.credential_repository.save(&credential).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &credential.user_id,
                "credential.decrypt",
                RESOURCE,
                id,
            ))
            .await;

        credential.secrets = plaintext;
        credential.encrypted = false;
        Ok(credential)
    }

    /// List a user's credentials, optionally filtered by vendor and
    /// capability. Secrets are always redacted.
    pub async fn list_credentials(
        &self,
        user_id: &str,
        provider: Option<Provider>,
        provider_type: Option<ProviderType>,
    ) -> CoreResult<Vec<StoredCredential>> {
        let credentials = self.ctx.credential_repository.find_by_user(user_id).await?;
        Ok(credentials
            .into_iter()
            .filter(|c| provider.is_none_or(|p| c.provider == p))
            .filter(|c| provider_type.is_none_or(|t| c.provider_type == t))
            .map(|c| c.redacted())
            .collect())
    }

    /// Apply a partial update. Replacing secrets re-seals them and resets
    /// the verified flag.
    pub async fn update_credential(
        &self,
        id: &str,
        request: UpdateCredentialRequest,
    ) -> CoreResult<StoredCredential> {
        let mut credential = self.require(id).await?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "credential name must not be empty".to_string(),
                ));
            }
            credential.name = name;
        }
        if let Some(credential_type) = request.credential_type {
            credential.credential_type = credential_type;
        }
        if let Some(secrets) = request.secrets {
            if secrets.is_empty() {
                return Err(CoreError::ValidationError(
                    "credential secrets must not be empty".to_string(),
                ));
            }
            credential.secrets = self.ctx.cipher.seal_map(&secrets)?;
            credential.encrypted = true;
            credential.verified = false;
        }
        credential.updated_at = Utc::now();

        self.ctx.credential_repository.save(&credential).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &credential.user_id,
                "credential.update",
                RESOURCE,
                id,
            ))
            .await;

        Ok(credential.redacted())
    }

    /// Delete a credential.
    pub async fn delete_credential(&self, id: &str) -> CoreResult<()> {
        let credential = self.require(id).await?;
        self.ctx.credential_repository.delete(id).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &credential.user_id,
                "credential.delete",
                RESOURCE,
                id,
            ))
            .await;
        Ok(())
    }

    /// Set the verified flag directly, for callers that validated the
    /// credential out of band.
    pub async fn mark_verified(&self, id: &str, verified: bool) -> CoreResult<StoredCredential> {
        let mut credential = self.require(id).await?;
        credential.verified = verified;
        credential.updated_at = Utc::now();
        self.ctx.credential_repository.save(&credential).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &credential.user_id,
                "credential.mark_verified",
                RESOURCE,
                id,
            ))
            .await;
        Ok(credential.redacted())
    }

    /// Probe the vendor with the stored secret and persist the result.
    ///
    /// `Ok(false)` means the vendor rejected the credential; transient
    /// failures propagate so the caller can retry.
    pub async fn verify_credential(&self, id: &str) -> CoreResult<bool> {
        let mut credential = self.require(id).await?;

        let plaintext = self.ctx.cipher.open_map(&credential.secrets)?;
        let vendor_credentials = ProviderCredentials::from_map(credential.provider, &plaintext)
            .map_err(CoreError::CredentialValidation)?;

        let verified = match credential.provider_type {
            ProviderType::Dns => {
                let adapter = self.ctx.dns_adapter(credential.provider).await?;
                adapter.verify_credential(&vendor_credentials).await?
            }
            ProviderType::Registrar => {
                let adapter = self.ctx.registrar_adapter(credential.provider).await?;
                adapter.verify_credential(&vendor_credentials).await?
            }
            ProviderType::Hosting => {
                return Err(CoreError::ValidationError(
                    "hosting credentials cannot be probed".to_string(),
                ));
            }
        };

        credential.verified = verified;
        credential.last_used_at = Some(Utc::now());
        credential.updated_at = Utc::now();
        self.ctx.credential_repository.save(&credential).await?;

        if verified {
            self.ctx
                .audit
                .send(AuditEvent::success(
                    &credential.user_id,
                    "credential.verify",
                    RESOURCE,
                    id,
                ))
                .await;
        } else {
            self.ctx
                .audit
                .send(AuditEvent::failure(
                    &credential.user_id,
                    "credential.verify",
                    RESOURCE,
                    id,
                    "vendor rejected the credential",
                ))
                .await;
        }

        Ok(verified)
    }

    async fn require(&self, id: &str) -> CoreResult<StoredCredential> {
        self.ctx
            .credential_repository
            .get(id)
            .await?
            .ok_or_else(|| CoreError::CredentialNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use orbit_domains_provider::CredentialType;

    use super::*;
    use crate::test_utils::create_test_context;

    fn create_request(user_id: &str) -> CreateCredentialRequest {
        CreateCredentialRequest {
            user_id: user_id.to_string(),
            provider: Provider::Cloudflare,
            provider_type: ProviderType::Dns,
            credential_type: CredentialType::ApiKey,
            name: "cf token".to_string(),
            secrets: [("apiToken".to_string(), "plain-token".to_string())].into(),
        }
    }

    #[tokio::test]
    async fn store_seals_and_redacts() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx.clone());

        let stored = service.store_credential(create_request("u1")).await.unwrap();
        assert_eq!(stored.secrets.get("apiToken").unwrap(), "[REDACTED]");

        // At rest the secret is sealed ciphertext, not plaintext.
        let at_rest = ctx
            .credential_repository
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(at_rest.encrypted);
        assert_ne!(at_rest.secrets.get("apiToken").unwrap(), "plain-token");
    }

    #[tokio::test]
    async fn store_rejects_capability_mismatch() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx);

        let mut request = create_request("u1");
        request.provider = Provider::Godaddy; // registrar-only vendor
        request.provider_type = ProviderType::Dns;

        let result = service.store_credential(request).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn decrypt_returns_plaintext_and_bumps_last_used() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx.clone());
        let stored = service.store_credential(create_request("u1")).await.unwrap();

        let plain = service.get_credential(&stored.id, true).await.unwrap();
        assert_eq!(plain.secrets.get("apiToken").unwrap(), "plain-token");

        let at_rest = ctx
            .credential_repository
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(at_rest.last_used_at.is_some());
    }

    #[tokio::test]
    async fn plain_read_never_bumps_last_used() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx.clone());
        let stored = service.store_credential(create_request("u1")).await.unwrap();

        let redacted = service.get_credential(&stored.id, false).await.unwrap();
        assert_eq!(redacted.secrets.get("apiToken").unwrap(), "[REDACTED]");

        let at_rest = ctx
            .credential_repository
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(at_rest.last_used_at.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_vendor_and_capability() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx);

        service.store_credential(create_request("u1")).await.unwrap();
        let mut registrar = create_request("u1");
        registrar.provider = Provider::Namecheap;
        registrar.provider_type = ProviderType::Registrar;
        registrar.secrets = HashMap::from([
            ("apiUser".to_string(), "u".to_string()),
            ("apiKey".to_string(), "k".to_string()),
            ("clientIp".to_string(), "1.2.3.4".to_string()),
        ]);
        service.store_credential(registrar).await.unwrap();

        let all = service.list_credentials("u1", None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let dns_only = service
            .list_credentials("u1", None, Some(ProviderType::Dns))
            .await
            .unwrap();
        assert_eq!(dns_only.len(), 1);
        assert_eq!(dns_only[0].provider, Provider::Cloudflare);

        let other_user = service.list_credentials("u2", None, None).await.unwrap();
        assert!(other_user.is_empty());
    }

    #[tokio::test]
    async fn updating_secrets_resets_verified() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx);
        let stored = service.store_credential(create_request("u1")).await.unwrap();

        let marked = service.mark_verified(&stored.id, true).await.unwrap();
        assert!(marked.verified);

        let updated = service
            .update_credential(
                &stored.id,
                UpdateCredentialRequest {
                    secrets: Some([("apiToken".to_string(), "rotated".to_string())].into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.verified);

        let plain = service.get_credential(&stored.id, true).await.unwrap();
        assert_eq!(plain.secrets.get("apiToken").unwrap(), "rotated");
    }

    #[tokio::test]
    async fn delete_unknown_credential() {
        let (ctx, _) = create_test_context();
        let service = CredentialService::new(ctx);
        let result = service.delete_credential("missing").await;
        assert!(matches!(result, Err(CoreError::CredentialNotFound(_))));
    }

    #[tokio::test]
    async fn probe_marks_credential_verified() {
        let (ctx, handles) = create_test_context();
        let service = CredentialService::new(ctx.clone());
        let stored = service.store_credential(create_request("u1")).await.unwrap();

        // The mock adapter accepts any credential.
        handles
            .cloudflare_dns
            .add_zone("z1", "example.com", vec![])
            .await;
        assert!(service.verify_credential(&stored.id).await.unwrap());

        let at_rest = ctx
            .credential_repository
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(at_rest.verified);
        assert!(at_rest.last_used_at.is_some());
    }

    #[tokio::test]
    async fn probe_failure_leaves_credential_unverified() {
        let (ctx, handles) = create_test_context();
        let service = CredentialService::new(ctx.clone());

        let mut request = create_request("u1");
        request.provider = Provider::Godaddy;
        request.provider_type = ProviderType::Registrar;
        request.secrets = HashMap::from([
            ("apiKey".to_string(), "k".to_string()),
            ("apiSecret".to_string(), "s".to_string()),
        ]);
        let stored = service.store_credential(request).await.unwrap();

        handles.godaddy_registrar.set_verify_result(false).await;
        assert!(!service.verify_credential(&stored.id).await.unwrap());

        let at_rest = ctx
            .credential_repository
            .get(&stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!at_rest.verified);
    }

    #[tokio::test]
    async fn mutations_are_audited() {
        let (ctx, handles) = create_test_context();
        let service = CredentialService::new(ctx);

        let stored = service.store_credential(create_request("u1")).await.unwrap();
        service.get_credential(&stored.id, true).await.unwrap();
        service.delete_credential(&stored.id).await.unwrap();

        let actions = handles.audit.actions().await;
        assert_eq!(
            actions,
            vec![
                "credential.store".to_string(),
                "credential.decrypt".to_string(),
                "credential.delete".to_string(),
            ]
        );
    }
}
