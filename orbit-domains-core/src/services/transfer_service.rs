//! Domain transfer orchestration.
//!
//! A transfer walks one domain through a forward-only pipeline:
//! ownership proof, DNS record copy, registrar nameserver cutover, and
//! source platform settings migration. Every status write is conditional
//! on the status the step started from, so concurrent workers cannot
//! double-apply a step.

use std::sync::Arc;

use chrono::Utc;
use orbit_domains_provider::{
    DnsRecordType, Provider, ProviderCredentials, ProviderError, ProviderType, RecordSpec,
};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    AuditEvent, DomainTransfer, StoredCredential, TransferSource, TransferStatus,
    VerificationMethod,
};
use crate::utils::{generate_verification_token, txt_record_name};

use super::{check_dns_txt, validate_domain, ServiceContext};

const RESOURCE: &str = "transfer";

/// Domain transfer operations.
pub struct TransferService {
    ctx: Arc<ServiceContext>,
}

impl TransferService {
    /// Create the service.
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Start a transfer for `domain` away from `source`.
    ///
    /// Issues the ownership token the user must publish as a TXT record.
    /// Credential ids may be attached now or supplied later via
    /// [`Self::set_credentials`]; they are only required once the DNS copy
    /// step runs.
    pub async fn initiate_transfer(
        &self,
        user_id: &str,
        domain: &str,
        source: &str,
        source_credential_id: Option<String>,
        target_credential_id: Option<String>,
    ) -> CoreResult<DomainTransfer> {
        validate_domain(domain)?;
        let source: TransferSource = source
            .parse()
            .map_err(CoreError::ValidationError)?;

        let now = Utc::now();
        let transfer = DomainTransfer {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            domain: domain.to_string(),
            source,
            verification_token: generate_verification_token(),
            verification_method: VerificationMethod::DnsTxt,
            source_credential_id,
            target_credential_id,
            status: TransferStatus::Initiated,
            error: None,
            created_at: now,
            updated_at: now,
        };

        self.ctx.transfer_repository.save(&transfer).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                user_id,
                "transfer.initiate",
                RESOURCE,
                &transfer.id,
            ))
            .await;

        Ok(transfer)
    }

    /// Attach or replace the source/target credential ids on a transfer
    /// that has not reached the DNS copy step yet.
    pub async fn set_credentials(
        &self,
        id: &str,
        source_credential_id: Option<String>,
        target_credential_id: Option<String>,
    ) -> CoreResult<DomainTransfer> {
        let mut transfer = self.require(id).await?;
        if !matches!(
            transfer.status,
            TransferStatus::Initiated | TransferStatus::OwnershipVerified
        ) {
            return Err(CoreError::InvalidState {
                operation: "set_credentials".to_string(),
                current: transfer.status.to_string(),
            });
        }

        let expected = transfer.status;
        if let Some(src) = source_credential_id {
            transfer.source_credential_id = Some(src);
        }
        if let Some(dst) = target_credential_id {
            transfer.target_credential_id = Some(dst);
        }
        transfer.updated_at = Utc::now();
        self.ctx
            .transfer_repository
            .update_if_status(&transfer, expected)
            .await?;
        Ok(transfer)
    }

    /// Check the ownership TXT record and advance to `OWNERSHIP_VERIFIED`.
    ///
    /// A failed check is terminal: the transfer moves to `FAILED` and this
    /// returns [`CoreError::TransferFailed`].
    pub async fn verify_ownership(&self, id: &str) -> CoreResult<DomainTransfer> {
        let mut transfer = self.require(id).await?;
        if transfer.status != TransferStatus::Initiated {
            return Err(CoreError::InvalidState {
                operation: "verify_ownership".to_string(),
                current: transfer.status.to_string(),
            });
        }

        let record_name = txt_record_name(&transfer.domain);
        let outcome = check_dns_txt(
            self.ctx.resolver.as_ref(),
            &record_name,
            &transfer.verification_token,
        )
        .await;

        if !outcome.success {
            let message = outcome
                .error
                .unwrap_or_else(|| "ownership verification failed".to_string());
            self.fail(&mut transfer, TransferStatus::Initiated, &message)
                .await?;
            self.ctx
                .audit
                .send(AuditEvent::failure(
                    &transfer.user_id,
                    "transfer.verify_ownership",
                    RESOURCE,
                    id,
                    &message,
                ))
                .await;
            return Err(CoreError::TransferFailed(message));
        }

        transfer.status = TransferStatus::OwnershipVerified;
        transfer.error = None;
        transfer.updated_at = Utc::now();
        self.ctx
            .transfer_repository
            .update_if_status(&transfer, TransferStatus::Initiated)
            .await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &transfer.user_id,
                "transfer.verify_ownership",
                RESOURCE,
                id,
            ))
            .await;

        Ok(transfer)
    }

    /// Copy all supported records from the source zone to the target zone
    /// and advance to `DNS_TRANSFERRED`.
    ///
    /// NS records are skipped (delegation moves in the next step). A
    /// record that already exists on the target counts as copied, which
    /// makes retries of a partially applied copy safe. If not a single
    /// record lands while the zone has records to copy, the transfer stays
    /// in `OWNERSHIP_VERIFIED` with the error recorded, and the call
    /// returns [`CoreError::TransferFailed`].
    pub async fn transfer_dns_records(&self, id: &str) -> CoreResult<DomainTransfer> {
        let mut transfer = self.require(id).await?;
        if transfer.status == TransferStatus::DnsTransferred {
            return Ok(transfer);
        }
        if transfer.status != TransferStatus::OwnershipVerified {
            return Err(CoreError::InvalidState {
                operation: "transfer_dns_records".to_string(),
                current: transfer.status.to_string(),
            });
        }

        let Some(source_credential_id) = transfer.source_credential_id.clone() else {
            return Err(CoreError::ValidationError(
                "transfer has no source credential".to_string(),
            ));
        };
        let Some(target_credential_id) = transfer.target_credential_id.clone() else {
            return Err(CoreError::ValidationError(
                "transfer has no target credential".to_string(),
            ));
        };

        let (source_provider, source_credentials) =
            self.vendor_credentials(&source_credential_id).await?;
        let (target_provider, target_credentials) =
            self.vendor_credentials(&target_credential_id).await?;
        let source_adapter = self.ctx.dns_adapter(source_provider).await?;
        let target_adapter = self.ctx.dns_adapter(target_provider).await?;

        let source_zone = source_adapter
            .find_zone(&source_credentials, &transfer.domain)
            .await?;
        let target_zone = target_adapter
            .find_zone(&target_credentials, &transfer.domain)
            .await?;
        let records = source_adapter
            .get_records(&source_credentials, &source_zone.id, None)
            .await?;

        let mut copied = 0usize;
        let mut failed = 0usize;
        let mut last_error: Option<String> = None;
        for record in &records {
            // Delegation is handled by the nameserver cutover step.
            if record.record_type == DnsRecordType::Ns {
                continue;
            }
            let spec = RecordSpec::from(record);
            match target_adapter
                .create_record(&target_credentials, &target_zone.id, &spec)
                .await
            {
                Ok(_) => copied += 1,
                Err(ProviderError::RecordExists { .. }) => {
                    log::debug!(
                        "record {} ({:?}) already present on {target_provider}",
                        record.name,
                        record.record_type
                    );
                    copied += 1;
                }
                Err(e) => {
                    log::warn!(
                        "failed to copy record {} to {target_provider}: {e}",
                        record.name
                    );
                    failed += 1;
                    last_error = Some(e.to_string());
                }
            }
        }

        if copied == 0 && failed > 0 {
            let message = format!(
                "no records copied to {target_provider}: {}",
                last_error.unwrap_or_else(|| "unknown error".to_string())
            );
            transfer.error = Some(message.clone());
            transfer.updated_at = Utc::now();
            self.ctx
                .transfer_repository
                .update_if_status(&transfer, TransferStatus::OwnershipVerified)
                .await?;
            self.ctx
                .audit
                .send(AuditEvent::failure(
                    &transfer.user_id,
                    "transfer.dns",
                    RESOURCE,
                    id,
                    &message,
                ))
                .await;
            return Err(CoreError::TransferFailed(message));
        }
        if failed > 0 {
            log::warn!("transfer {id}: {failed} records failed to copy, {copied} landed");
        }

        transfer.status = TransferStatus::DnsTransferred;
        transfer.error = None;
        transfer.updated_at = Utc::now();
        self.ctx
            .transfer_repository
            .update_if_status(&transfer, TransferStatus::OwnershipVerified)
            .await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &transfer.user_id,
                "transfer.dns",
                RESOURCE,
                id,
            ))
            .await;

        Ok(transfer)
    }

    /// Point the domain's delegation at the supplied nameservers and
    /// advance to `NAMESERVERS_UPDATED`.
    ///
    /// The registrar adapter is resolved from the transfer's credentials
    /// when one of them belongs to a registrar-capable vendor, falling
    /// back to the user's stored registrar credentials. A registrar
    /// failure moves the transfer to `FAILED`.
    pub async fn update_nameservers(
        &self,
        id: &str,
        nameservers: &[String],
    ) -> CoreResult<DomainTransfer> {
        let mut transfer = self.require(id).await?;
        if transfer.status != TransferStatus::DnsTransferred {
            return Err(CoreError::InvalidState {
                operation: "update_nameservers".to_string(),
                current: transfer.status.to_string(),
            });
        }
        if nameservers.is_empty() {
            return Err(CoreError::ValidationError(
                "nameservers must not be empty".to_string(),
            ));
        }

        let (registrar_provider, registrar_credentials) =
            self.registrar_credentials(&transfer).await?;
        let registrar = self.ctx.registrar_adapter(registrar_provider).await?;

        match registrar
            .update_nameservers(&registrar_credentials, &transfer.domain, nameservers)
            .await
        {
            Ok(_) => {
                transfer.status = TransferStatus::NameserversUpdated;
                transfer.error = None;
                transfer.updated_at = Utc::now();
                self.ctx
                    .transfer_repository
                    .update_if_status(&transfer, TransferStatus::DnsTransferred)
                    .await?;
                self.ctx
                    .audit
                    .send(AuditEvent::success(
                        &transfer.user_id,
                        "transfer.nameservers",
                        RESOURCE,
                        id,
                    ))
                    .await;
                Ok(transfer)
            }
            Err(e) => {
                let message = e.to_string();
                self.fail(&mut transfer, TransferStatus::DnsTransferred, &message)
                    .await?;
                self.ctx
                    .audit
                    .send(AuditEvent::failure(
                        &transfer.user_id,
                        "transfer.nameservers",
                        RESOURCE,
                        id,
                        &message,
                    ))
                    .await;
                Err(CoreError::Provider(e))
            }
        }
    }

    /// Move application settings off the source platform, associate the
    /// domain with the application identified by `app_id`, and advance to
    /// the terminal `SETTINGS_MIGRATED` status.
    pub async fn migrate_app_settings(&self, id: &str, app_id: &str) -> CoreResult<DomainTransfer> {
        let mut transfer = self.require(id).await?;
        if transfer.status != TransferStatus::NameserversUpdated {
            return Err(CoreError::InvalidState {
                operation: "migrate_app_settings".to_string(),
                current: transfer.status.to_string(),
            });
        }
        if app_id.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "app_id is required".to_string(),
            ));
        }

        match self
            .ctx
            .settings_migrator
            .migrate(&transfer.user_id, app_id, &transfer.domain, transfer.source)
            .await
        {
            Ok(()) => {
                transfer.status = TransferStatus::SettingsMigrated;
                transfer.error = None;
                transfer.updated_at = Utc::now();
                self.ctx
                    .transfer_repository
                    .update_if_status(&transfer, TransferStatus::NameserversUpdated)
                    .await?;
                self.ctx
                    .audit
                    .send(AuditEvent::success(
                        &transfer.user_id,
                        "transfer.settings",
                        RESOURCE,
                        id,
                    ))
                    .await;
                Ok(transfer)
            }
            Err(e) => {
                let message = e.to_string();
                self.fail(&mut transfer, TransferStatus::NameserversUpdated, &message)
                    .await?;
                self.ctx
                    .audit
                    .send(AuditEvent::failure(
                        &transfer.user_id,
                        "transfer.settings",
                        RESOURCE,
                        id,
                        &message,
                    ))
                    .await;
                Err(e)
            }
        }
    }

    /// Fetch a transfer by id.
    pub async fn get_transfer(&self, id: &str) -> CoreResult<DomainTransfer> {
        self.require(id).await
    }

    /// All transfers belonging to a user.
    pub async fn get_transfers_for_user(&self, user_id: &str) -> CoreResult<Vec<DomainTransfer>> {
        self.ctx.transfer_repository.find_by_user(user_id).await
    }

    /// All transfers for a domain, across users.
    pub async fn get_transfers_for_domain(&self, domain: &str) -> CoreResult<Vec<DomainTransfer>> {
        self.ctx.transfer_repository.find_by_domain(domain).await
    }

    /// Delete a transfer in any state. Provider-side records are left in
    /// place; deletion never rolls anything back.
    pub async fn delete_transfer(&self, id: &str) -> CoreResult<()> {
        let transfer = self.require(id).await?;
        self.ctx.transfer_repository.delete(id).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &transfer.user_id,
                "transfer.delete",
                RESOURCE,
                id,
            ))
            .await;
        Ok(())
    }

    /// Load a credential, open its secrets, and build vendor credentials.
    async fn vendor_credentials(
        &self,
        credential_id: &str,
    ) -> CoreResult<(Provider, ProviderCredentials)> {
        let credential = self
            .ctx
            .credential_repository
            .get(credential_id)
            .await?
            .ok_or_else(|| CoreError::CredentialNotFound(credential_id.to_string()))?;
        self.open_credential(&credential)
    }

    /// Credentials for the registrar holding the domain.
    ///
    /// Prefers the transfer's attached credentials when their vendor has a
    /// registered registrar adapter; otherwise falls back to the first of
    /// the user's registrar credentials whose vendor has one.
    async fn registrar_credentials(
        &self,
        transfer: &DomainTransfer,
    ) -> CoreResult<(Provider, ProviderCredentials)> {
        let attached = [&transfer.source_credential_id, &transfer.target_credential_id];
        for credential_id in attached.into_iter().flatten() {
            let credential = self
                .ctx
                .credential_repository
                .get(credential_id)
                .await?
                .ok_or_else(|| CoreError::CredentialNotFound(credential_id.clone()))?;
            if self
                .ctx
                .adapter_registry
                .registrar(credential.provider)
                .await
                .is_some()
            {
                return self.open_credential(&credential);
            }
        }

        for credential in self
            .ctx
            .credential_repository
            .find_by_user(&transfer.user_id)
            .await?
        {
            if credential.provider_type == ProviderType::Registrar
                && self
                    .ctx
                    .adapter_registry
                    .registrar(credential.provider)
                    .await
                    .is_some()
            {
                return self.open_credential(&credential);
            }
        }

        Err(CoreError::ValidationError(
            "no registrar credential available for the nameserver update".to_string(),
        ))
    }

    fn open_credential(
        &self,
        credential: &StoredCredential,
    ) -> CoreResult<(Provider, ProviderCredentials)> {
        let plaintext = self.ctx.cipher.open_map(&credential.secrets)?;
        let vendor_credentials = ProviderCredentials::from_map(credential.provider, &plaintext)
            .map_err(CoreError::CredentialValidation)?;
        Ok((credential.provider, vendor_credentials))
    }

    /// Persist the terminal `FAILED` status via a conditional write.
    async fn fail(
        &self,
        transfer: &mut DomainTransfer,
        expected: TransferStatus,
        message: &str,
    ) -> CoreResult<()> {
        transfer.status = TransferStatus::Failed;
        transfer.error = Some(message.to_string());
        transfer.updated_at = Utc::now();
        self.ctx
            .transfer_repository
            .update_if_status(transfer, expected)
            .await
    }

    async fn require(&self, id: &str) -> CoreResult<DomainTransfer> {
        self.ctx
            .transfer_repository
            .get(id)
            .await?
            .ok_or_else(|| CoreError::TransferNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use orbit_domains_provider::CredentialType;

    use super::*;
    use crate::services::CredentialService;
    use crate::test_utils::{create_test_context, TestHandles};
    use crate::types::CreateCredentialRequest;

    /// Store a Cloudflare (source) and Route53 (target) credential for `u1`.
    async fn store_credentials(ctx: &Arc<ServiceContext>) -> (String, String) {
        let credentials = CredentialService::new(ctx.clone());
        let source = credentials
            .store_credential(CreateCredentialRequest {
                user_id: "u1".to_string(),
                provider: Provider::Cloudflare,
                provider_type: ProviderType::Dns,
                credential_type: CredentialType::ApiKey,
                name: "source".to_string(),
                secrets: [("apiToken".to_string(), "cf-token".to_string())].into(),
            })
            .await
            .unwrap();
        let target = credentials
            .store_credential(CreateCredentialRequest {
                user_id: "u1".to_string(),
                provider: Provider::Route53,
                provider_type: ProviderType::Dns,
                credential_type: CredentialType::ApiSecret,
                name: "target".to_string(),
                secrets: [
                    ("accessKeyId".to_string(), "AKIA123".to_string()),
                    ("secretAccessKey".to_string(), "shh".to_string()),
                ]
                .into(),
            })
            .await
            .unwrap();
        (source.id, target.id)
    }

    /// Store a GoDaddy registrar credential for `u1`.
    async fn store_registrar_credential(ctx: &Arc<ServiceContext>) -> String {
        let credentials = CredentialService::new(ctx.clone());
        credentials
            .store_credential(CreateCredentialRequest {
                user_id: "u1".to_string(),
                provider: Provider::Godaddy,
                provider_type: ProviderType::Registrar,
                credential_type: CredentialType::ApiSecret,
                name: "registrar".to_string(),
                secrets: [
                    ("apiKey".to_string(), "gd-key".to_string()),
                    ("apiSecret".to_string(), "gd-secret".to_string()),
                ]
                .into(),
            })
            .await
            .unwrap()
            .id
    }

    fn target_nameservers() -> Vec<String> {
        vec!["ns1.orbit.dns".to_string(), "ns2.orbit.dns".to_string()]
    }

    /// Seed both providers with an `example.com` zone; the source side
    /// carries A, MX, and NS records.
    async fn seed_zones(handles: &TestHandles) {
        handles
            .cloudflare_dns
            .add_zone("cf-zone", "example.com", vec![])
            .await;
        handles
            .route53_dns
            .add_zone(
                "r53-zone",
                "example.com",
                vec!["ns1.orbit.dns".to_string(), "ns2.orbit.dns".to_string()],
            )
            .await;

        for spec in [
            RecordSpec {
                name: "example.com".to_string(),
                record_type: DnsRecordType::A,
                content: "203.0.113.7".to_string(),
                ttl: 300,
                priority: None,
                proxied: false,
            },
            RecordSpec {
                name: "example.com".to_string(),
                record_type: DnsRecordType::Mx,
                content: "mail.example.com".to_string(),
                ttl: 3600,
                priority: Some(10),
                proxied: false,
            },
            RecordSpec {
                name: "example.com".to_string(),
                record_type: DnsRecordType::Ns,
                content: "ns.source.dns".to_string(),
                ttl: 86400,
                priority: None,
                proxied: false,
            },
        ] {
            handles.cloudflare_dns.add_record("cf-zone", &spec).await;
        }
    }

    /// Create a transfer and walk it to `OWNERSHIP_VERIFIED`.
    async fn verified_transfer(
        service: &TransferService,
        ctx: &Arc<ServiceContext>,
        handles: &TestHandles,
    ) -> DomainTransfer {
        let (source_id, target_id) = store_credentials(ctx).await;
        let transfer = service
            .initiate_transfer("u1", "example.com", "wix", Some(source_id), Some(target_id))
            .await
            .unwrap();
        handles
            .resolver
            .set_txt(
                "_orbithost-verify.example.com",
                vec![transfer.verification_token.clone()],
            )
            .await;
        service.verify_ownership(&transfer.id).await.unwrap()
    }

    #[tokio::test]
    async fn initiate_issues_token() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        let transfer = service
            .initiate_transfer("u1", "example.com", "wix", None, None)
            .await
            .unwrap();
        assert_eq!(transfer.status, TransferStatus::Initiated);
        assert_eq!(transfer.source, TransferSource::Wix);
        assert_eq!(transfer.verification_method, VerificationMethod::DnsTxt);
        assert_eq!(transfer.verification_token.len(), 32);
    }

    #[tokio::test]
    async fn initiate_rejects_unknown_source() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        let result = service
            .initiate_transfer("u1", "example.com", "geocities", None, None)
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn verify_ownership_advances_on_published_token() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());

        let transfer = verified_transfer(&service, &ctx, &handles).await;
        assert_eq!(transfer.status, TransferStatus::OwnershipVerified);
        assert!(transfer.error.is_none());
    }

    #[tokio::test]
    async fn verify_ownership_failure_is_terminal() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        let transfer = service
            .initiate_transfer("u1", "example.com", "lovable", None, None)
            .await
            .unwrap();
        // No TXT record published.
        let result = service.verify_ownership(&transfer.id).await;
        assert!(matches!(result, Err(CoreError::TransferFailed(_))));

        let stored = service.get_transfer(&transfer.id).await.unwrap();
        assert_eq!(stored.status, TransferStatus::Failed);
        assert!(stored.error.is_some());

        // A failed transfer cannot be re-verified.
        let retry = service.verify_ownership(&transfer.id).await;
        assert!(matches!(retry, Err(CoreError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn dns_copy_moves_records_verbatim_and_skips_ns() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;

        let transfer = service.transfer_dns_records(&transfer.id).await.unwrap();
        assert_eq!(transfer.status, TransferStatus::DnsTransferred);

        let copied = handles.route53_dns.zone_records("r53-zone").await;
        assert_eq!(copied.len(), 2);
        assert!(copied
            .iter()
            .all(|r| r.record_type != DnsRecordType::Ns));

        let mx = copied
            .iter()
            .find(|r| r.record_type == DnsRecordType::Mx)
            .unwrap();
        assert_eq!(mx.content, "mail.example.com");
        assert_eq!(mx.ttl, 3600);
        assert_eq!(mx.priority, Some(10));
    }

    #[tokio::test]
    async fn dns_copy_retry_is_idempotent() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        // One record is already on the target from an earlier partial run.
        handles
            .route53_dns
            .add_record(
                "r53-zone",
                &RecordSpec {
                    name: "example.com".to_string(),
                    record_type: DnsRecordType::A,
                    content: "203.0.113.7".to_string(),
                    ttl: 300,
                    priority: None,
                    proxied: false,
                },
            )
            .await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;

        let transfer = service.transfer_dns_records(&transfer.id).await.unwrap();
        assert_eq!(transfer.status, TransferStatus::DnsTransferred);
        assert_eq!(handles.route53_dns.zone_records("r53-zone").await.len(), 2);

        // Calling the step again is a no-op.
        let again = service.transfer_dns_records(&transfer.id).await.unwrap();
        assert_eq!(again.status, TransferStatus::DnsTransferred);
        assert_eq!(handles.route53_dns.zone_records("r53-zone").await.len(), 2);
    }

    #[tokio::test]
    async fn dns_copy_with_zero_successes_keeps_status() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        handles.route53_dns.set_fail_create(true).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;

        let result = service.transfer_dns_records(&transfer.id).await;
        assert!(matches!(result, Err(CoreError::TransferFailed(_))));

        let stored = service.get_transfer(&transfer.id).await.unwrap();
        assert_eq!(stored.status, TransferStatus::OwnershipVerified);
        assert!(stored.error.is_some());

        // The step can be retried once the target recovers.
        handles.route53_dns.set_fail_create(false).await;
        let retried = service.transfer_dns_records(&transfer.id).await.unwrap();
        assert_eq!(retried.status, TransferStatus::DnsTransferred);
    }

    #[tokio::test]
    async fn dns_copy_requires_credentials() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());

        let transfer = service
            .initiate_transfer("u1", "example.com", "replit", None, None)
            .await
            .unwrap();
        handles
            .resolver
            .set_txt(
                "_orbithost-verify.example.com",
                vec![transfer.verification_token.clone()],
            )
            .await;
        service.verify_ownership(&transfer.id).await.unwrap();

        let result = service.transfer_dns_records(&transfer.id).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));

        // Failing fast leaves the status untouched.
        let stored = service.get_transfer(&transfer.id).await.unwrap();
        assert_eq!(stored.status, TransferStatus::OwnershipVerified);
    }

    #[tokio::test]
    async fn nameserver_cutover_resolves_users_registrar_credential() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;
        service.transfer_dns_records(&transfer.id).await.unwrap();

        // The attached credentials are DNS-only vendors; the step falls
        // back to the user's stored registrar credential.
        store_registrar_credential(&ctx).await;

        let transfer = service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await
            .unwrap();
        assert_eq!(transfer.status, TransferStatus::NameserversUpdated);

        let calls = handles.godaddy_registrar.nameserver_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].domain, "example.com");
        assert_eq!(calls[0].nameservers, target_nameservers());
    }

    #[tokio::test]
    async fn nameserver_cutover_requires_a_registrar_credential() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;
        service.transfer_dns_records(&transfer.id).await.unwrap();

        // Neither attached credential belongs to a registrar-capable
        // vendor and the user holds no registrar credential.
        let result = service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));

        // Failing fast leaves the status untouched and the step retryable.
        let stored = service.get_transfer(&transfer.id).await.unwrap();
        assert_eq!(stored.status, TransferStatus::DnsTransferred);

        store_registrar_credential(&ctx).await;
        let retried = service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await
            .unwrap();
        assert_eq!(retried.status, TransferStatus::NameserversUpdated);
    }

    #[tokio::test]
    async fn nameserver_cutover_rejects_empty_list() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;
        service.transfer_dns_records(&transfer.id).await.unwrap();
        store_registrar_credential(&ctx).await;

        let result = service.update_nameservers(&transfer.id, &[]).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        assert!(handles.godaddy_registrar.nameserver_calls().await.is_empty());
    }

    #[tokio::test]
    async fn nameserver_cutover_failure_marks_transfer_failed() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        handles.godaddy_registrar.set_fail_update(true).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;
        service.transfer_dns_records(&transfer.id).await.unwrap();
        store_registrar_credential(&ctx).await;

        let result = service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await;
        assert!(matches!(result, Err(CoreError::Provider(_))));

        let stored = service.get_transfer(&transfer.id).await.unwrap();
        assert_eq!(stored.status, TransferStatus::Failed);
        assert!(stored.error.is_some());
    }

    #[tokio::test]
    async fn steps_reject_out_of_order_calls() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        let transfer = service
            .initiate_transfer("u1", "example.com", "cursor", None, None)
            .await
            .unwrap();

        let dns = service.transfer_dns_records(&transfer.id).await;
        assert!(matches!(dns, Err(CoreError::InvalidState { .. })));
        let ns = service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await;
        assert!(matches!(ns, Err(CoreError::InvalidState { .. })));
        let settings = service.migrate_app_settings(&transfer.id, "app-1").await;
        assert!(matches!(settings, Err(CoreError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn settings_migration_completes_the_pipeline() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;
        let transfer = verified_transfer(&service, &ctx, &handles).await;
        service.transfer_dns_records(&transfer.id).await.unwrap();
        store_registrar_credential(&ctx).await;
        service
            .update_nameservers(&transfer.id, &target_nameservers())
            .await
            .unwrap();

        let missing_app = service.migrate_app_settings(&transfer.id, "  ").await;
        assert!(matches!(missing_app, Err(CoreError::ValidationError(_))));

        let transfer = service
            .migrate_app_settings(&transfer.id, "app-42")
            .await
            .unwrap();
        assert_eq!(transfer.status, TransferStatus::SettingsMigrated);

        let calls = handles.migrator.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].app_id, "app-42");
        assert_eq!(calls[0].source, TransferSource::Wix);

        // The pipeline is terminal now.
        let retry = service.migrate_app_settings(&transfer.id, "app-42").await;
        assert!(matches!(retry, Err(CoreError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn transfers_listed_by_domain() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        service
            .initiate_transfer("u1", "example.com", "wix", None, None)
            .await
            .unwrap();
        service
            .initiate_transfer("u2", "example.com", "replit", None, None)
            .await
            .unwrap();
        service
            .initiate_transfer("u1", "other.org", "wix", None, None)
            .await
            .unwrap();

        let by_domain = service
            .get_transfers_for_domain("example.com")
            .await
            .unwrap();
        assert_eq!(by_domain.len(), 2);
        assert!(by_domain.iter().all(|t| t.domain == "example.com"));

        let by_user = service.get_transfers_for_user("u1").await.unwrap();
        assert_eq!(by_user.len(), 2);
    }

    #[tokio::test]
    async fn delete_works_in_any_state() {
        let (ctx, _handles) = create_test_context();
        let service = TransferService::new(ctx);

        let transfer = service
            .initiate_transfer("u1", "example.com", "other", None, None)
            .await
            .unwrap();
        service.delete_transfer(&transfer.id).await.unwrap();

        let result = service.get_transfer(&transfer.id).await;
        assert!(matches!(result, Err(CoreError::TransferNotFound(_))));
    }

    #[tokio::test]
    async fn set_credentials_only_before_dns_copy() {
        let (ctx, handles) = create_test_context();
        let service = TransferService::new(ctx.clone());
        seed_zones(&handles).await;

        let (source_id, target_id) = store_credentials(&ctx).await;
        let transfer = service
            .initiate_transfer("u1", "example.com", "wix", None, None)
            .await
            .unwrap();

        let updated = service
            .set_credentials(&transfer.id, Some(source_id), Some(target_id))
            .await
            .unwrap();
        assert!(updated.source_credential_id.is_some());

        handles
            .resolver
            .set_txt(
                "_orbithost-verify.example.com",
                vec![transfer.verification_token.clone()],
            )
            .await;
        service.verify_ownership(&transfer.id).await.unwrap();
        service.transfer_dns_records(&transfer.id).await.unwrap();

        let late = service.set_credentials(&transfer.id, None, None).await;
        assert!(matches!(late, Err(CoreError::InvalidState { .. })));
    }
}
