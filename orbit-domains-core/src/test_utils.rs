//! Mock implementations of the storage and collaborator traits.
//!
//! Available to this crate's unit tests and, behind the `test-utils`
//! feature, to downstream integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use orbit_domains_provider::{
    DnsProviderAdapter, DnsRecord, DnsRecordType, DomainAvailability, DomainDetails,
    DomainSearchResult, NameserverUpdate, Provider, ProviderCredentials, ProviderError,
    RecordSpec, RegistrarAdapter, RegistrationRequest, RegistrationResult, Zone, ZoneStatus,
};
use tokio::sync::RwLock;

use crate::crypto::CredentialCipher;
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{
    AdapterRegistry, AppSettingsMigrator, AuditSink, DnsResolver, HttpFetcher,
    InMemoryCredentialRepository, InMemoryTransferRepository, InMemoryVerificationRepository,
    Mailer,
};
use crate::types::{AuditEvent, TransferSource};

/// In-memory DNS adapter with injectable failures.
pub struct MockDnsAdapter {
    id: &'static str,
    zones: RwLock<Vec<Zone>>,
    records: RwLock<HashMap<String, Vec<DnsRecord>>>,
    next_record_id: RwLock<u64>,
    fail_create: RwLock<bool>,
}

impl MockDnsAdapter {
    /// Create an empty adapter answering as `id`.
    #[must_use]
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            zones: RwLock::new(Vec::new()),
            records: RwLock::new(HashMap::new()),
            next_record_id: RwLock::new(1),
            fail_create: RwLock::new(false),
        }
    }

    /// Add a zone with the given apex name and nameservers.
    pub async fn add_zone(&self, zone_id: &str, name: &str, name_servers: Vec<String>) {
        self.zones.write().await.push(Zone {
            id: zone_id.to_string(),
            name: name.to_string(),
            status: ZoneStatus::Active,
            name_servers,
        });
        self.records
            .write()
            .await
            .entry(zone_id.to_string())
            .or_default();
    }

    /// Add a record directly to a zone.
    pub async fn add_record(&self, zone_id: &str, spec: &RecordSpec) {
        let record = self.build_record(spec).await;
        self.records
            .write()
            .await
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
    }

    /// Make every subsequent `create_record` call fail.
    pub async fn set_fail_create(&self, fail: bool) {
        *self.fail_create.write().await = fail;
    }

    /// Current records of a zone.
    pub async fn zone_records(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.records
            .read()
            .await
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn build_record(&self, spec: &RecordSpec) -> DnsRecord {
        let mut next = self.next_record_id.write().await;
        let id = format!("rec-{}", *next);
        *next += 1;
        DnsRecord {
            id,
            name: spec.name.clone(),
            record_type: spec.record_type,
            content: spec.content.clone(),
            ttl: spec.ttl,
            priority: spec.priority,
            proxied: spec.proxied,
        }
    }

    fn zone_not_found(&self, zone_id: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: self.id.to_string(),
            zone_id: zone_id.to_string(),
            raw_message: None,
        }
    }
}

#[async_trait]
impl DnsProviderAdapter for MockDnsAdapter {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn get_zones(
        &self,
        _credentials: &ProviderCredentials,
    ) -> Result<Vec<Zone>, ProviderError> {
        Ok(self.zones.read().await.clone())
    }

    async fn get_zone(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
    ) -> Result<Zone, ProviderError> {
        self.zones
            .read()
            .await
            .iter()
            .find(|z| z.id == zone_id)
            .cloned()
            .ok_or_else(|| self.zone_not_found(zone_id))
    }

    async fn get_records(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
        type_filter: Option<DnsRecordType>,
    ) -> Result<Vec<DnsRecord>, ProviderError> {
        let records = self.records.read().await;
        let Some(zone_records) = records.get(zone_id) else {
            return Err(self.zone_not_found(zone_id));
        };
        Ok(zone_records
            .iter()
            .filter(|r| type_filter.is_none_or(|t| r.record_type == t))
            .cloned()
            .collect())
    }

    async fn get_record(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<DnsRecord, ProviderError> {
        let records = self.records.read().await;
        records
            .get(zone_id)
            .and_then(|rs| rs.iter().find(|r| r.id == record_id))
            .cloned()
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: self.id.to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })
    }

    async fn create_record(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord, ProviderError> {
        if *self.fail_create.read().await {
            return Err(ProviderError::Unknown {
                provider: self.id.to_string(),
                raw_code: None,
                raw_message: "injected create failure".to_string(),
            });
        }

        let new_record = self.build_record(record).await;
        let mut records = self.records.write().await;
        let Some(zone_records) = records.get_mut(zone_id) else {
            return Err(self.zone_not_found(zone_id));
        };
        let duplicate = zone_records.iter().any(|r| {
            r.name == record.name
                && r.record_type == record.record_type
                && r.content == record.content
        });
        if duplicate {
            return Err(ProviderError::RecordExists {
                provider: self.id.to_string(),
                record_name: record.name.clone(),
                raw_message: None,
            });
        }
        zone_records.push(new_record.clone());
        Ok(new_record)
    }

    async fn update_record(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord, ProviderError> {
        let mut records = self.records.write().await;
        let Some(existing) = records
            .get_mut(zone_id)
            .and_then(|rs| rs.iter_mut().find(|r| r.id == record_id))
        else {
            return Err(ProviderError::RecordNotFound {
                provider: self.id.to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            });
        };
        existing.name = record.name.clone();
        existing.record_type = record.record_type;
        existing.content = record.content.clone();
        existing.ttl = record.ttl;
        existing.priority = record.priority;
        existing.proxied = record.proxied;
        Ok(existing.clone())
    }

    async fn delete_record(
        &self,
        _credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<bool, ProviderError> {
        let mut records = self.records.write().await;
        let Some(zone_records) = records.get_mut(zone_id) else {
            return Err(self.zone_not_found(zone_id));
        };
        let before = zone_records.len();
        zone_records.retain(|r| r.id != record_id);
        Ok(zone_records.len() < before)
    }
}

/// One recorded nameserver cutover.
#[derive(Debug, Clone)]
pub struct NameserverCall {
    /// Domain whose delegation was changed.
    pub domain: String,
    /// Nameservers that were set.
    pub nameservers: Vec<String>,
}

/// Registrar adapter that records calls instead of talking to a vendor.
pub struct MockRegistrarAdapter {
    id: &'static str,
    nameserver_calls: RwLock<Vec<NameserverCall>>,
    fail_update: RwLock<bool>,
    verify_result: RwLock<bool>,
}

impl MockRegistrarAdapter {
    /// Create an adapter answering as `id`.
    #[must_use]
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            nameserver_calls: RwLock::new(Vec::new()),
            fail_update: RwLock::new(false),
            verify_result: RwLock::new(true),
        }
    }

    /// Make every subsequent `update_nameservers` call fail.
    pub async fn set_fail_update(&self, fail: bool) {
        *self.fail_update.write().await = fail;
    }

    /// Set the outcome of `verify_credential`.
    pub async fn set_verify_result(&self, verified: bool) {
        *self.verify_result.write().await = verified;
    }

    /// All recorded nameserver cutovers.
    pub async fn nameserver_calls(&self) -> Vec<NameserverCall> {
        self.nameserver_calls.read().await.clone()
    }
}

#[async_trait]
impl RegistrarAdapter for MockRegistrarAdapter {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn check_availability(
        &self,
        _credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainAvailability, ProviderError> {
        Ok(DomainAvailability {
            domain: domain.to_string(),
            available: true,
            price: None,
            currency: None,
        })
    }

    async fn search_domains(
        &self,
        _credentials: &ProviderCredentials,
        _keyword: &str,
        _tlds: Option<&[String]>,
    ) -> Result<Vec<DomainSearchResult>, ProviderError> {
        Ok(Vec::new())
    }

    async fn register_domain(
        &self,
        _credentials: &ProviderCredentials,
        domain: &str,
        _request: &RegistrationRequest,
    ) -> Result<RegistrationResult, ProviderError> {
        Ok(RegistrationResult {
            domain: domain.to_string(),
            order_id: Some("mock-order".to_string()),
            status: "completed".to_string(),
        })
    }

    async fn get_domain_details(
        &self,
        _credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainDetails, ProviderError> {
        Ok(DomainDetails {
            domain: domain.to_string(),
            status: "active".to_string(),
            created_at: None,
            expires_at: None,
            nameservers: Vec::new(),
            locked: false,
            auto_renew: false,
        })
    }

    async fn update_nameservers(
        &self,
        _credentials: &ProviderCredentials,
        domain: &str,
        nameservers: &[String],
    ) -> Result<NameserverUpdate, ProviderError> {
        if *self.fail_update.read().await {
            return Err(ProviderError::PermissionDenied {
                provider: self.id.to_string(),
                raw_message: Some("injected update failure".to_string()),
            });
        }
        self.nameserver_calls.write().await.push(NameserverCall {
            domain: domain.to_string(),
            nameservers: nameservers.to_vec(),
        });
        Ok(NameserverUpdate {
            domain: domain.to_string(),
            nameservers: nameservers.to_vec(),
        })
    }

    async fn verify_credential(
        &self,
        _credentials: &ProviderCredentials,
    ) -> Result<bool, ProviderError> {
        Ok(*self.verify_result.read().await)
    }
}

/// Resolver answering from a preset name-to-TXT map.
///
/// Names without an entry behave like NXDOMAIN (a lookup error).
#[derive(Default)]
pub struct MockResolver {
    txt: RwLock<HashMap<String, Vec<String>>>,
}

impl MockResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish TXT values under `name`.
    pub async fn set_txt(&self, name: &str, values: Vec<String>) {
        self.txt.write().await.insert(name.to_string(), values);
    }
}

#[async_trait]
impl DnsResolver for MockResolver {
    async fn lookup_txt(&self, name: &str) -> CoreResult<Vec<String>> {
        self.txt
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::ValidationError(format!("TXT lookup for {name} failed")))
    }
}

/// Fetcher answering from a preset URL-to-body map.
#[derive(Default)]
pub struct MockFetcher {
    bodies: RwLock<HashMap<String, String>>,
}

impl MockFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub async fn set_body(&self, url: &str, body: &str) {
        self.bodies
            .write()
            .await
            .insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn fetch_body(&self, url: &str) -> CoreResult<String> {
        self.bodies
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| CoreError::ValidationError(format!("GET {url} failed")))
    }
}

/// One captured verification code email.
#[derive(Debug, Clone)]
pub struct SentCode {
    /// Recipient address.
    pub email: String,
    /// Domain under verification.
    pub domain: String,
    /// Issued code.
    pub code: String,
}

/// Mailer that captures outbound codes instead of sending them.
#[derive(Default)]
pub struct MockMailer {
    sent: RwLock<Vec<SentCode>>,
}

impl MockMailer {
    /// Create an empty mailer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured codes.
    pub async fn sent(&self) -> Vec<SentCode> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_verification_code(
        &self,
        email: &str,
        domain: &str,
        code: &str,
    ) -> CoreResult<()> {
        self.sent.write().await.push(SentCode {
            email: email.to_string(),
            domain: domain.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

/// Audit sink collecting events in memory.
#[derive(Default)]
pub struct CollectingAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl CollectingAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected events.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    /// Actions of all collected events, in order.
    pub async fn actions(&self) -> Vec<String> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditSink for CollectingAuditSink {
    async fn send(&self, event: AuditEvent) {
        self.events.write().await.push(event);
    }
}

/// One recorded settings migration.
#[derive(Debug, Clone)]
pub struct MigrationCall {
    /// User the migration ran for.
    pub user_id: String,
    /// Application the domain was associated with.
    pub app_id: String,
    /// Migrated domain.
    pub domain: String,
    /// Source platform.
    pub source: TransferSource,
}

/// Settings migrator that records calls.
#[derive(Default)]
pub struct MockSettingsMigrator {
    calls: RwLock<Vec<MigrationCall>>,
    fail: RwLock<bool>,
}

impl MockSettingsMigrator {
    /// Create a migrator that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `migrate` call fail.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// All recorded migrations.
    pub async fn calls(&self) -> Vec<MigrationCall> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl AppSettingsMigrator for MockSettingsMigrator {
    async fn migrate(
        &self,
        user_id: &str,
        app_id: &str,
        domain: &str,
        source: TransferSource,
    ) -> CoreResult<()> {
        if *self.fail.read().await {
            return Err(CoreError::TransferFailed(
                "injected migration failure".to_string(),
            ));
        }
        self.calls.write().await.push(MigrationCall {
            user_id: user_id.to_string(),
            app_id: app_id.to_string(),
            domain: domain.to_string(),
            source,
        });
        Ok(())
    }
}

/// Handles onto the mocks wired into a test context.
///
/// The registry mirrors the capability table of the real factory: DNS
/// adapters under the DNS-capable vendors, registrar adapters under the
/// registrar-capable ones.
pub struct TestHandles {
    /// DNS adapter registered under [`Provider::Cloudflare`].
    pub cloudflare_dns: Arc<MockDnsAdapter>,
    /// DNS adapter registered under [`Provider::Route53`].
    pub route53_dns: Arc<MockDnsAdapter>,
    /// Registrar adapter registered under [`Provider::Godaddy`].
    pub godaddy_registrar: Arc<MockRegistrarAdapter>,
    /// Registrar adapter registered under [`Provider::Namecheap`].
    pub namecheap_registrar: Arc<MockRegistrarAdapter>,
    /// TXT resolver.
    pub resolver: Arc<MockResolver>,
    /// HTTP fetcher.
    pub fetcher: Arc<MockFetcher>,
    /// Mailer.
    pub mailer: Arc<MockMailer>,
    /// Audit sink.
    pub audit: Arc<CollectingAuditSink>,
    /// Settings migrator.
    pub migrator: Arc<MockSettingsMigrator>,
}

/// Build a [`ServiceContext`] wired entirely with in-memory mocks.
#[must_use]
pub fn create_test_context() -> (Arc<ServiceContext>, TestHandles) {
    let cloudflare_dns = Arc::new(MockDnsAdapter::new("cloudflare"));
    let route53_dns = Arc::new(MockDnsAdapter::new("route53"));
    let godaddy_registrar = Arc::new(MockRegistrarAdapter::new("godaddy"));
    let namecheap_registrar = Arc::new(MockRegistrarAdapter::new("namecheap"));

    let mut dns: HashMap<Provider, Arc<dyn DnsProviderAdapter>> = HashMap::new();
    dns.insert(Provider::Cloudflare, cloudflare_dns.clone());
    dns.insert(Provider::Route53, route53_dns.clone());
    let mut registrars: HashMap<Provider, Arc<dyn RegistrarAdapter>> = HashMap::new();
    registrars.insert(Provider::Godaddy, godaddy_registrar.clone());
    registrars.insert(Provider::Namecheap, namecheap_registrar.clone());

    let resolver = Arc::new(MockResolver::new());
    let fetcher = Arc::new(MockFetcher::new());
    let mailer = Arc::new(MockMailer::new());
    let audit = Arc::new(CollectingAuditSink::new());
    let migrator = Arc::new(MockSettingsMigrator::new());

    let ctx = Arc::new(ServiceContext::new(
        Arc::new(InMemoryCredentialRepository::new()),
        Arc::new(InMemoryVerificationRepository::new()),
        Arc::new(InMemoryTransferRepository::new()),
        Arc::new(AdapterRegistry::with_adapters(dns, registrars)),
        Arc::new(CredentialCipher::new("test-master-key")),
        audit.clone(),
        resolver.clone(),
        fetcher.clone(),
        mailer.clone(),
        migrator.clone(),
    ));

    let handles = TestHandles {
        cloudflare_dns,
        route53_dns,
        godaddy_registrar,
        namecheap_registrar,
        resolver,
        fetcher,
        mailer,
        audit,
        migrator,
    };

    (ctx, handles)
}
