//! Core domain types: stored credentials, ownership verifications,
//! transfer workflow state, audit events.

mod audit;
mod credential;
mod transfer;
mod verification;

pub use audit::AuditEvent;
pub use credential::{CreateCredentialRequest, StoredCredential, UpdateCredentialRequest};
pub use transfer::{DomainTransfer, TransferSource, TransferStatus};
pub use verification::{
    DomainVerification, VerificationChallenge, VerificationMethod, VerificationStatus,
    VerifyOutcome,
};
