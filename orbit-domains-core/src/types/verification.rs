//! Domain ownership verification types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How ownership of a domain is proven.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMethod {
    /// TXT record under a well-known name must carry the issued token.
    DnsTxt,
    /// A well-known HTTP path must serve the issued token.
    Http,
    /// A code mailed to the domain contact must be echoed back.
    Email,
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DnsTxt => write!(f, "DNS_TXT"),
            Self::Http => write!(f, "HTTP"),
            Self::Email => write!(f, "EMAIL"),
        }
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DNS_TXT" => Ok(Self::DnsTxt),
            "HTTP" => Ok(Self::Http),
            "EMAIL" => Ok(Self::Email),
            other => Err(format!("unknown verification method: {other}")),
        }
    }
}

/// Lifecycle of a verification. Transitions are one-way: once terminal,
/// a verification never changes again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Challenge issued, waiting for proof.
    Pending,
    /// Proof observed.
    Verified,
    /// Proof check failed or the challenge expired.
    Failed,
}

impl VerificationStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Verified => write!(f, "VERIFIED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Method-specific challenge material issued at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationChallenge {
    /// Publish `record_value` as a TXT record at `record_name`.
    DnsTxt {
        /// Fully qualified TXT record owner name.
        record_name: String,
        /// Token that must appear in the record data.
        record_value: String,
    },
    /// Serve `expected_body` at `path` on the apex over plain HTTP.
    Http {
        /// Well-known path relative to the domain root.
        path: String,
        /// Exact body the path must return (surrounding whitespace ignored).
        expected_body: String,
    },
    /// Echo back the code mailed to `email`.
    Email {
        /// Address the code was sent to.
        email: String,
        /// Issued code.
        code: String,
    },
}

/// A single domain ownership verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainVerification {
    /// Unique verification id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Domain under verification.
    pub domain: String,
    /// Chosen proof method.
    pub method: VerificationMethod,
    /// Challenge material issued for the method.
    pub challenge: VerificationChallenge,
    /// Current lifecycle status.
    pub status: VerificationStatus,
    /// Failure detail when `status == Failed`.
    pub error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Hard deadline; checks after this instant fail closed.
    pub expires_at: DateTime<Utc>,
    /// When the proof was observed.
    pub verified_at: Option<DateTime<Utc>>,
}

/// Result of a single verification check.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    /// Whether the proof was observed.
    pub success: bool,
    /// Failure detail on an unsuccessful check.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!VerificationStatus::Pending.is_terminal());
        assert!(VerificationStatus::Verified.is_terminal());
        assert!(VerificationStatus::Failed.is_terminal());
    }

    #[test]
    fn method_round_trips_through_str() {
        for method in [
            VerificationMethod::DnsTxt,
            VerificationMethod::Http,
            VerificationMethod::Email,
        ] {
            let parsed: VerificationMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
        assert!("CARRIER_PIGEON".parse::<VerificationMethod>().is_err());
    }

    #[test]
    fn challenge_serializes_tagged() {
        let challenge = VerificationChallenge::DnsTxt {
            record_name: "_orbithost-verify.example.com".to_string(),
            record_value: "tok".to_string(),
        };
        let json = serde_json::to_string(&challenge).unwrap();
        assert!(json.contains("\"type\":\"DNS_TXT\""));
    }
}
