//! Abstraction traits for storage and external collaborators.
//!
//! Services depend on these traits only. Production wires real
//! implementations (database repositories, SMTP mailer, ...); tests wire
//! the in-memory/mock implementations.

mod adapter_registry;
mod audit_sink;
mod credential_repository;
mod fetcher;
mod mailer;
mod resolver;
mod settings_migrator;
mod transfer_repository;
mod verification_repository;

pub use adapter_registry::AdapterRegistry;
pub use audit_sink::{AuditSink, LogAuditSink};
pub use credential_repository::{CredentialRepository, InMemoryCredentialRepository};
pub use fetcher::{HttpFetcher, ReqwestFetcher};
pub use mailer::{LogMailer, Mailer};
pub use resolver::{DnsResolver, SystemDnsResolver};
pub use settings_migrator::AppSettingsMigrator;
pub use transfer_repository::{InMemoryTransferRepository, TransferRepository};
pub use verification_repository::{InMemoryVerificationRepository, VerificationRepository};
