//! Stored credential types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use orbit_domains_provider::{CredentialType, Provider, ProviderType};
use serde::{Deserialize, Serialize};

/// Placeholder substituted for secret values whenever a credential leaves
/// the service without an explicit decrypt request.
pub(crate) const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// A vendor credential held in the vault.
///
/// `secrets` values are sealed ciphertext while the credential is at rest
/// (`encrypted == true`). They only ever contain plaintext inside the
/// service layer, immediately before an adapter call or an explicit
/// decrypting read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Unique credential id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Vendor this credential authenticates against.
    pub provider: Provider,
    /// Capability the credential is registered for.
    pub provider_type: ProviderType,
    /// Shape of the secret material.
    pub credential_type: CredentialType,
    /// Display name chosen by the user.
    pub name: String,
    /// Secret fields, keyed by the vendor's field names.
    pub secrets: HashMap<String, String>,
    /// Whether `secrets` currently holds ciphertext.
    pub encrypted: bool,
    /// Whether the credential passed a live vendor probe.
    pub verified: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Last time the plaintext was handed out or used against the vendor.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    /// Copy of this credential with every secret value replaced by a
    /// redaction placeholder. Safe to return to callers and to log.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for value in copy.secrets.values_mut() {
            *value = REDACTED_PLACEHOLDER.to_string();
        }
        copy.encrypted = false;
        copy
    }
}

/// Request payload for storing a new credential.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCredentialRequest {
    /// Owning user.
    pub user_id: String,
    /// Vendor the credential belongs to.
    pub provider: Provider,
    /// Capability the credential grants.
    pub provider_type: ProviderType,
    /// Shape of the secret material.
    pub credential_type: CredentialType,
    /// Display name.
    pub name: String,
    /// Plaintext secret fields, keyed by the vendor's field names.
    pub secrets: HashMap<String, String>,
}

/// Partial update for an existing credential. `None` fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCredentialRequest {
    /// New display name.
    pub name: Option<String>,
    /// Replacement plaintext secrets. Replaces the whole map when present.
    pub secrets: Option<HashMap<String, String>>,
    /// New credential type.
    pub credential_type: Option<CredentialType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_masks_every_secret_value() {
        let credential = StoredCredential {
            id: "cred-1".to_string(),
            user_id: "user-1".to_string(),
            provider: Provider::Cloudflare,
            provider_type: ProviderType::Dns,
            credential_type: CredentialType::ApiKey,
            name: "prod token".to_string(),
            secrets: [("apiToken".to_string(), "sealed-bytes".to_string())].into(),
            encrypted: true,
            verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_used_at: None,
        };

        let redacted = credential.redacted();
        assert_eq!(
            redacted.secrets.get("apiToken").map(String::as_str),
            Some(REDACTED_PLACEHOLDER)
        );
        assert!(!redacted.encrypted);
        // The original is untouched.
        assert_eq!(
            credential.secrets.get("apiToken").map(String::as_str),
            Some("sealed-bytes")
        );
    }
}
