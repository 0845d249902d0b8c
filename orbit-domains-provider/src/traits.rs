use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    DnsRecord, DnsRecordType, DomainAvailability, DomainDetails, DomainSearchResult,
    NameserverUpdate, ProviderCredentials, RecordSpec, RegistrationRequest, RegistrationResult,
    Zone,
};

/// Raw API error (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Vendor-specific error code.
    pub code: Option<String>,
    /// Raw error message.
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Error context (internal).
/// Carries extra identifiers for mapping raw errors to typed variants.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name (for `RecordExists` and similar).
    pub record_name: Option<String>,
    /// Record ID (for `RecordNotFound` and similar).
    pub record_id: Option<String>,
    /// Zone ID (for `ZoneNotFound` and similar).
    pub zone_id: Option<String>,
    /// Domain name (for `DomainNotFound` and similar).
    pub domain: Option<String>,
}

/// Error mapping trait (internal).
/// Each adapter implements this to map raw API errors to the unified error type.
pub(crate) trait ProviderErrorMapper {
    /// Vendor identifier used in error payloads.
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type.
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse failure.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error fallback.
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Uniform interface over DNS providers for zone/record CRUD.
///
/// Adapters are stateless vendor singletons: credentials are passed on every
/// call and never cached inside the adapter. Each adapter validates that the
/// credential variant matches its vendor and returns
/// [`ProviderError::InvalidCredentials`] otherwise.
#[async_trait]
pub trait DnsProviderAdapter: Send + Sync {
    /// Vendor identifier.
    fn id(&self) -> &'static str;

    /// List all zones visible to the credential.
    async fn get_zones(&self, credentials: &ProviderCredentials) -> Result<Vec<Zone>>;

    /// Fetch a single zone by provider id.
    async fn get_zone(&self, credentials: &ProviderCredentials, zone_id: &str) -> Result<Zone>;

    /// List records in a zone, optionally filtered by type.
    async fn get_records(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        type_filter: Option<DnsRecordType>,
    ) -> Result<Vec<DnsRecord>>;

    /// Fetch a single record by provider id.
    async fn get_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<DnsRecord>;

    /// Create a record in a zone.
    async fn create_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord>;

    /// Update an existing record.
    async fn update_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord>;

    /// Delete a record. Returns `true` when the provider confirmed deletion.
    async fn delete_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<bool>;

    /// Resolve a zone by apex name.
    ///
    /// Default implementation lists zones and matches on the normalized name.
    async fn find_zone(&self, credentials: &ProviderCredentials, domain: &str) -> Result<Zone> {
        let wanted = domain.trim_end_matches('.').to_lowercase();
        let zones = self.get_zones(credentials).await?;
        zones
            .into_iter()
            .find(|z| z.name.trim_end_matches('.').to_lowercase() == wanted)
            .ok_or_else(|| ProviderError::ZoneNotFound {
                provider: self.id().to_string(),
                zone_id: domain.to_string(),
                raw_message: None,
            })
    }

    /// Make a low-cost authenticated call and report whether the credential works.
    ///
    /// Expected auth failures come back as `Ok(false)`; transient failures
    /// propagate so the caller can retry.
    async fn verify_credential(&self, credentials: &ProviderCredentials) -> Result<bool> {
        match self.get_zones(credentials).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                log::warn!("[{}] credential check failed: {e}", self.id());
                Ok(false)
            }
        }
    }
}

/// Uniform interface over domain registrars.
///
/// Same statelessness and error-wrapping contract as [`DnsProviderAdapter`]:
/// provider HTTP errors are wrapped into [`ProviderError`], HTTP 429 is
/// surfaced as `RateLimited`, and no retries happen inside the adapter.
#[async_trait]
pub trait RegistrarAdapter: Send + Sync {
    /// Vendor identifier.
    fn id(&self) -> &'static str;

    /// Check whether a single domain can be registered.
    async fn check_availability(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainAvailability>;

    /// Search for registrable domains by keyword, optionally limited to TLDs.
    async fn search_domains(
        &self,
        credentials: &ProviderCredentials,
        keyword: &str,
        tlds: Option<&[String]>,
    ) -> Result<Vec<DomainSearchResult>>;

    /// Place a registration order.
    async fn register_domain(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResult>;

    /// Fetch registrar-side details for a domain in the account.
    async fn get_domain_details(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainDetails>;

    /// Replace the domain's delegation (nameserver cutover).
    async fn update_nameservers(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        nameservers: &[String],
    ) -> Result<NameserverUpdate>;

    /// Make a low-cost authenticated call and report whether the credential works.
    async fn verify_credential(&self, credentials: &ProviderCredentials) -> Result<bool>;
}
