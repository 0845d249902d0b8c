//! Business logic service layer.

mod credential_service;
mod transfer_service;
mod verification_service;

pub use credential_service::CredentialService;
pub use transfer_service::TransferService;
pub use verification_service::VerificationService;

use std::sync::Arc;

use orbit_domains_provider::{DnsProviderAdapter, Provider, RegistrarAdapter};

use crate::crypto::CredentialCipher;
use crate::error::{CoreError, CoreResult};
use crate::traits::{
    AdapterRegistry, AppSettingsMigrator, AuditSink, CredentialRepository, DnsResolver,
    HttpFetcher, Mailer, TransferRepository, VerificationRepository,
};
use crate::types::VerifyOutcome;

/// Service context holding every dependency.
///
/// The platform layer creates this context, injecting its storage and
/// collaborator implementations.
pub struct ServiceContext {
    /// Credential vault persistence.
    pub credential_repository: Arc<dyn CredentialRepository>,
    /// Verification persistence.
    pub verification_repository: Arc<dyn VerificationRepository>,
    /// Transfer persistence.
    pub transfer_repository: Arc<dyn TransferRepository>,
    /// Vendor adapter registry.
    pub adapter_registry: Arc<AdapterRegistry>,
    /// Secret sealing.
    pub cipher: Arc<CredentialCipher>,
    /// Audit trail destination.
    pub audit: Arc<dyn AuditSink>,
    /// TXT challenge resolver.
    pub resolver: Arc<dyn DnsResolver>,
    /// HTTP challenge fetcher.
    pub fetcher: Arc<dyn HttpFetcher>,
    /// Email challenge mailer.
    pub mailer: Arc<dyn Mailer>,
    /// Source platform settings migrator.
    pub settings_migrator: Arc<dyn AppSettingsMigrator>,
}

impl ServiceContext {
    /// Create a service context.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credential_repository: Arc<dyn CredentialRepository>,
        verification_repository: Arc<dyn VerificationRepository>,
        transfer_repository: Arc<dyn TransferRepository>,
        adapter_registry: Arc<AdapterRegistry>,
        cipher: Arc<CredentialCipher>,
        audit: Arc<dyn AuditSink>,
        resolver: Arc<dyn DnsResolver>,
        fetcher: Arc<dyn HttpFetcher>,
        mailer: Arc<dyn Mailer>,
        settings_migrator: Arc<dyn AppSettingsMigrator>,
    ) -> Self {
        Self {
            credential_repository,
            verification_repository,
            transfer_repository,
            adapter_registry,
            cipher,
            audit,
            resolver,
            fetcher,
            mailer,
            settings_migrator,
        }
    }

    /// DNS adapter for a vendor.
    pub async fn dns_adapter(&self, provider: Provider) -> CoreResult<Arc<dyn DnsProviderAdapter>> {
        self.adapter_registry.dns(provider).await.ok_or_else(|| {
            CoreError::ValidationError(format!("no DNS adapter registered for {provider}"))
        })
    }

    /// Registrar adapter for a vendor.
    pub async fn registrar_adapter(
        &self,
        provider: Provider,
    ) -> CoreResult<Arc<dyn RegistrarAdapter>> {
        self.adapter_registry
            .registrar(provider)
            .await
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "no registrar adapter registered for {provider}"
                ))
            })
    }
}

/// Check whether the TXT records at `record_name` carry `expected`.
///
/// Shared between standalone verifications and the transfer workflow's
/// ownership step. Lookup failures (including NXDOMAIN) are an
/// unsuccessful outcome, not an error.
pub(crate) async fn check_dns_txt(
    resolver: &dyn DnsResolver,
    record_name: &str,
    expected: &str,
) -> VerifyOutcome {
    match resolver.lookup_txt(record_name).await {
        Ok(values) => {
            if values.iter().any(|v| v.trim() == expected) {
                VerifyOutcome {
                    success: true,
                    error: None,
                }
            } else {
                VerifyOutcome {
                    success: false,
                    error: Some(format!(
                        "expected token not found in TXT records of {record_name}"
                    )),
                }
            }
        }
        Err(e) => VerifyOutcome {
            success: false,
            error: Some(format!("TXT lookup failed: {e}")),
        },
    }
}

/// Minimal domain shape check shared by the services.
pub(crate) fn validate_domain(domain: &str) -> CoreResult<()> {
    let d = domain.trim();
    if d.is_empty() {
        return Err(CoreError::ValidationError("domain is required".to_string()));
    }
    if !d.contains('.') || d.starts_with('.') || d.ends_with('.') || d.contains(char::is_whitespace)
    {
        return Err(CoreError::ValidationError(format!(
            "invalid domain name: {domain}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_validation() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("sub.example.co.uk").is_ok());
        assert!(validate_domain("").is_err());
        assert!(validate_domain("nodots").is_err());
        assert!(validate_domain(".example.com").is_err());
        assert!(validate_domain("exa mple.com").is_err());
    }
}
