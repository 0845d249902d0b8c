//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error types
pub use orbit_domains_provider::{CredentialValidationError, ProviderError};

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Credential not found
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    /// Verification not found
    #[error("Verification not found: {0}")]
    VerificationNotFound(String),

    /// Transfer not found
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// Operation not allowed in the entity's current state
    #[error("Cannot {operation} while in state {current}")]
    InvalidState { operation: String, current: String },

    /// Conditional write lost against a concurrent update
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Transfer step failed
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Credential storage/decryption error
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// Credential validation errors (structured, supports field level errors)
    #[error("{0}")]
    CredentialValidation(CredentialValidationError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Provider error (converted from the adapter library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::CredentialNotFound(_)
            | Self::VerificationNotFound(_)
            | Self::TransferNotFound(_)
            | Self::InvalidState { .. }
            | Self::ConcurrentModification(_)
            | Self::TransferFailed(_)
            | Self::ValidationError(_)
            | Self::CredentialValidation(_) => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_state() {
        let e = CoreError::InvalidState {
            operation: "transfer_dns_records".to_string(),
            current: "INITIATED".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Cannot transfer_dns_records while in state INITIATED"
        );
    }

    #[test]
    fn expected_classification() {
        assert!(CoreError::CredentialNotFound("c1".to_string()).is_expected());
        assert!(CoreError::ValidationError("bad input".to_string()).is_expected());
        assert!(!CoreError::StorageError("disk".to_string()).is_expected());
    }

    #[test]
    fn provider_error_delegates_classification() {
        let expected = CoreError::Provider(ProviderError::ZoneNotFound {
            provider: "cloudflare".to_string(),
            zone_id: "z1".to_string(),
            raw_message: None,
        });
        assert!(expected.is_expected());

        let unexpected = CoreError::Provider(ProviderError::ParseError {
            provider: "cloudflare".to_string(),
            detail: "bad json".to_string(),
        });
        assert!(!unexpected.is_expected());
    }

    #[test]
    fn serializes_tagged_by_code() {
        let e = CoreError::ValidationError("domain is required".to_string());
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"ValidationError\""));
        assert!(json.contains("domain is required"));
    }
}
