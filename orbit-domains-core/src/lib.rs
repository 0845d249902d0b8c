//! OrbitHost Domains Core Library
//!
//! Provides the business logic for moving customer domains onto
//! OrbitHost-managed infrastructure:
//! - Credential vault (sealed vendor secrets)
//! - Domain ownership verification (DNS TXT / HTTP / email challenges)
//! - Transfer orchestration (record copy, nameserver cutover, settings migration)
//!
//! This library is platform-independent: storage and external
//! collaborators (resolver, mailer, audit trail) are abstracted through
//! traits and injected via [`ServiceContext`].

pub mod crypto;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{CredentialService, ServiceContext, TransferService, VerificationService};
pub use traits::{
    AdapterRegistry, AppSettingsMigrator, AuditSink, CredentialRepository, DnsResolver,
    HttpFetcher, Mailer, TransferRepository, VerificationRepository,
};
