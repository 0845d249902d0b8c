//! # orbit-domains-provider
//!
//! A unified vendor abstraction for domain hosting transfers: DNS zone and
//! record CRUD on one side, registrar operations (availability, registration,
//! delegation) on the other.
//!
//! ## Supported Vendors
//!
//! | Vendor | Capability | Auth Method |
//! |--------|-----------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | DNS | Bearer Token |
//! | [Amazon Route 53](https://aws.amazon.com/route53/) | DNS | AWS SigV4 |
//! | [GoDaddy](https://www.godaddy.com/) | Registrar | sso-key |
//! | [Namecheap](https://www.namecheap.com/) | Registrar | API key + whitelisted IP |
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)* — Use rustls. Recommended for cross-compilation.
//! - **`native-tls`** — Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! Adapters are stateless: credentials travel with every call, so a single
//! adapter instance serves any number of accounts for its vendor.
//!
//! ```rust,no_run
//! use orbit_domains_provider::{
//!     create_dns_adapter, Provider, ProviderCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = create_dns_adapter(Provider::Cloudflare)
//!         .ok_or("cloudflare has no DNS capability")?;
//!
//!     let credentials = ProviderCredentials::Cloudflare {
//!         api_token: "your-token".to_string(),
//!     };
//!
//!     // Cheap authenticated probe
//!     if !adapter.verify_credential(&credentials).await? {
//!         return Err("credential rejected".into());
//!     }
//!
//!     for zone in adapter.get_zones(&credentials).await? {
//!         println!("{} ({:?})", zone.name, zone.status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError) with
//! structured variants for the common failure modes:
//!
//! - [`ProviderError::InvalidCredentials`] — authentication failed
//! - [`ProviderError::RecordExists`] — a conflicting record already exists
//! - [`ProviderError::RateLimited`] — API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`] — network connectivity issue (retryable)
//!
//! Adapters never retry internally. Use [`ProviderError::is_retryable`] to
//! drive a backoff policy in the caller.

mod error;
mod factory;
mod http_client;
mod providers;
mod registrars;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{create_dns_adapter, create_registrar_adapter};

// Re-export adapter traits (internal traits are not exported)
pub use traits::{DnsProviderAdapter, RegistrarAdapter};

// Re-export types
pub use types::{
    ContactInfo, CredentialType, CredentialValidationError, DnsRecord, DnsRecordType,
    DomainAvailability,
    DomainDetails, DomainSearchResult, NameserverUpdate, Provider, ProviderCredentials,
    ProviderType, RecordSpec, RegistrationRequest, RegistrationResult, Zone, ZoneStatus,
};

// Re-export concrete adapters
pub use providers::{CloudflareAdapter, Route53Adapter};
pub use registrars::{GodaddyAdapter, NamecheapAdapter};
