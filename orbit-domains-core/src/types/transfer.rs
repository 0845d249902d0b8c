//! Domain transfer workflow types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::verification::VerificationMethod;

/// Platform the domain is being moved away from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferSource {
    /// Lovable-hosted app.
    Lovable,
    /// Replit-hosted app.
    Replit,
    /// Cursor-hosted app.
    Cursor,
    /// Wix site.
    Wix,
    /// Any other origin.
    Other,
}

impl std::fmt::Display for TransferSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lovable => write!(f, "lovable"),
            Self::Replit => write!(f, "replit"),
            Self::Cursor => write!(f, "cursor"),
            Self::Wix => write!(f, "wix"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for TransferSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lovable" => Ok(Self::Lovable),
            "replit" => Ok(Self::Replit),
            "cursor" => Ok(Self::Cursor),
            "wix" => Ok(Self::Wix),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown transfer source: {other}")),
        }
    }
}

/// Transfer pipeline stage.
///
/// The pipeline only moves forward. `Failed` is reachable from any
/// non-terminal stage; nothing leaves `Failed` or `SettingsMigrated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Transfer created, ownership unproven.
    Initiated,
    /// Ownership proof observed.
    OwnershipVerified,
    /// DNS records copied to the target provider.
    DnsTransferred,
    /// Registrar delegation updated to the target nameservers.
    NameserversUpdated,
    /// Application settings moved off the source platform.
    SettingsMigrated,
    /// Pipeline aborted.
    Failed,
}

impl TransferStatus {
    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Initiated, Self::OwnershipVerified)
            | (Self::OwnershipVerified, Self::DnsTransferred)
            | (Self::DnsTransferred, Self::NameserversUpdated)
            | (Self::NameserversUpdated, Self::SettingsMigrated) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::SettingsMigrated | Self::Failed)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiated => write!(f, "INITIATED"),
            Self::OwnershipVerified => write!(f, "OWNERSHIP_VERIFIED"),
            Self::DnsTransferred => write!(f, "DNS_TRANSFERRED"),
            Self::NameserversUpdated => write!(f, "NAMESERVERS_UPDATED"),
            Self::SettingsMigrated => write!(f, "SETTINGS_MIGRATED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One domain moving from a source platform onto OrbitHost-managed
/// infrastructure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainTransfer {
    /// Unique transfer id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Domain being moved.
    pub domain: String,
    /// Platform the domain is leaving.
    pub source: TransferSource,
    /// Ownership proof token issued at initiation.
    pub verification_token: String,
    /// Proof method the token was issued for.
    pub verification_method: VerificationMethod,
    /// Credential for the source DNS provider.
    pub source_credential_id: Option<String>,
    /// Credential for the target DNS provider.
    pub target_credential_id: Option<String>,
    /// Current pipeline stage.
    pub status: TransferStatus,
    /// Failure detail for the most recent failed step.
    pub error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
