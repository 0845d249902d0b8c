//! Shared types for the registrar / DNS adapter surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============ Vendor & Capability Types ============

/// Identifies a supported vendor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Cloudflare (DNS hosting).
    Cloudflare,
    /// AWS Route53 (DNS hosting).
    Route53,
    /// GoDaddy (domain registrar).
    Godaddy,
    /// Namecheap (domain registrar).
    Namecheap,
}

impl Provider {
    /// Which capabilities this vendor exposes.
    ///
    /// Capability lookup drives adapter selection at runtime; a vendor may
    /// serve more than one role.
    #[must_use]
    pub fn capabilities(self) -> &'static [ProviderType] {
        match self {
            Self::Cloudflare | Self::Route53 => &[ProviderType::Dns],
            Self::Godaddy | Self::Namecheap => &[ProviderType::Registrar],
        }
    }

    /// Whether the vendor supports the given capability.
    #[must_use]
    pub fn supports(self, provider_type: ProviderType) -> bool {
        self.capabilities().contains(&provider_type)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cloudflare => write!(f, "cloudflare"),
            Self::Route53 => write!(f, "route53"),
            Self::Godaddy => write!(f, "godaddy"),
            Self::Namecheap => write!(f, "namecheap"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudflare" => Ok(Self::Cloudflare),
            "route53" | "aws_route53" => Ok(Self::Route53),
            "godaddy" => Ok(Self::Godaddy),
            "namecheap" => Ok(Self::Namecheap),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Capability a credential grants access to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderType {
    /// Domain registrar operations (availability, registration, nameservers).
    Registrar,
    /// DNS zone/record operations.
    Dns,
    /// Hosting platform integration.
    Hosting,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registrar => write!(f, "REGISTRAR"),
            Self::Dns => write!(f, "DNS"),
            Self::Hosting => write!(f, "HOSTING"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "REGISTRAR" => Ok(Self::Registrar),
            "DNS" => Ok(Self::Dns),
            "HOSTING" => Ok(Self::Hosting),
            other => Err(format!("unknown provider type: {other}")),
        }
    }
}

/// How a stored credential authenticates against its vendor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
    /// Single API key/token.
    ApiKey,
    /// Key + secret pair.
    ApiSecret,
    /// OAuth access token.
    OauthToken,
    /// Username/password pair.
    UsernamePassword,
    /// Anything else.
    Other,
}

impl std::fmt::Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "API_KEY"),
            Self::ApiSecret => write!(f, "API_SECRET"),
            Self::OauthToken => write!(f, "OAUTH_TOKEN"),
            Self::UsernamePassword => write!(f, "USERNAME_PASSWORD"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

impl std::str::FromStr for CredentialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "API_KEY" => Ok(Self::ApiKey),
            "API_SECRET" => Ok(Self::ApiSecret),
            "OAUTH_TOKEN" => Ok(Self::OauthToken),
            "USERNAME_PASSWORD" => Ok(Self::UsernamePassword),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown credential type: {other}")),
        }
    }
}

// ============ Zone Types ============

/// Status of a zone within a DNS provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Zone is active and resolving.
    Active,
    /// Zone is paused (not resolving).
    Paused,
    /// Zone is pending activation/verification.
    Pending,
    /// Status could not be determined.
    Unknown,
}

/// A DNS provider's container for all records of one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific zone identifier.
    pub id: String,
    /// Zone apex name (e.g., `"example.com"`).
    pub name: String,
    /// Current zone status.
    pub status: ZoneStatus,
    /// Nameservers assigned to this zone by the provider.
    #[serde(default)]
    pub name_servers: Vec<String>,
}

// ============ DNS Record Types ============

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
}

/// One provider-side DNS entry in a provider-agnostic shape.
///
/// `(name, type)` is not unique — a zone may hold several records of the same
/// name and type (e.g., multiple MX), distinguished by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DnsRecord {
    /// Provider-specific record identifier.
    pub id: String,
    /// Fully qualified record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value (address, hostname, text payload, ...).
    pub content: String,
    /// Time-to-live in seconds.
    pub ttl: u32,
    /// Priority (MX/SRV only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Provider-specific proxying flag (Cloudflare orange cloud).
    #[serde(default)]
    pub proxied: bool,
}

/// Write-side shape for record create/update calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordSpec {
    /// Fully qualified record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value.
    pub content: String,
    /// Time-to-live in seconds.
    pub ttl: u32,
    /// Priority (MX/SRV only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Provider-specific proxying flag.
    #[serde(default)]
    pub proxied: bool,
}

impl From<&DnsRecord> for RecordSpec {
    fn from(record: &DnsRecord) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type,
            content: record.content.clone(),
            ttl: record.ttl,
            priority: record.priority,
            proxied: record.proxied,
        }
    }
}

// ============ Registrar Types ============

/// Result of a registrar availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAvailability {
    /// Domain that was checked.
    pub domain: String,
    /// Whether the domain can be registered.
    pub available: bool,
    /// Registration price, if the registrar reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// ISO currency code for `price`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// One entry in a registrar domain-name search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSearchResult {
    /// Suggested domain name.
    pub domain: String,
    /// Whether the suggestion can be registered.
    pub available: bool,
    /// Registration price, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Registrant contact details for a registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Parameters for registering a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Registration period in years.
    pub years: u32,
    /// Registrant contact; registrars reject orders without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    /// Initial nameservers; registrar defaults apply when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,
    /// Whether the registrar should auto-renew the domain.
    #[serde(default)]
    pub auto_renew: bool,
}

/// Outcome of a registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResult {
    /// Registered domain name.
    pub domain: String,
    /// Registrar order identifier, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Registrar-reported order status (e.g., `"completed"`, `"pending"`).
    pub status: String,
}

/// Registrar-side view of a registered domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDetails {
    /// Domain name.
    pub domain: String,
    /// Registrar-reported status string.
    pub status: String,
    /// Registration timestamp (RFC 3339), if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Expiry timestamp (RFC 3339), if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Current delegation.
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// Whether a transfer lock is active.
    #[serde(default)]
    pub locked: bool,
    /// Whether auto-renew is enabled.
    #[serde(default)]
    pub auto_renew: bool,
}

/// Outcome of a nameserver update at the registrar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameserverUpdate {
    /// Domain whose delegation changed.
    pub domain: String,
    /// Nameservers now on file.
    pub nameservers: Vec<String>,
}

// ============ Credentials ============

/// Validation error for provider credentials.
///
/// Returned when credential fields are missing, empty, or have an invalid format.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required credential field is missing entirely.
    MissingField {
        /// Which vendor the error relates to.
        provider: Provider,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
    /// A credential field is present but empty/whitespace-only.
    EmptyField {
        /// Which vendor the error relates to.
        provider: Provider,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
    /// A credential field has an invalid format.
    InvalidFormat {
        /// Which vendor the error relates to.
        provider: Provider,
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
        /// Description of what's wrong with the format.
        reason: String,
    },
}

impl std::fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { label, .. } => write!(f, "Missing required field: {label}"),
            Self::EmptyField { label, .. } => write!(f, "Field must not be empty: {label}"),
            Self::InvalidFormat { label, reason, .. } => write!(f, "{label}: {reason}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Type-safe credential container for all supported vendors.
///
/// Each variant holds the authentication fields required by that vendor.
/// Adapters are stateless; credentials are passed on every call.
///
/// # Serialization
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"credentials"`
/// as the content:
///
/// ```json
/// { "provider": "cloudflare", "credentials": { "api_token": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// Cloudflare credentials.
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Cloudflare API token.
        api_token: String,
    },

    /// AWS Route53 credentials.
    #[serde(rename = "route53")]
    Route53 {
        /// AWS Access Key ID.
        access_key_id: String,
        /// AWS Secret Access Key.
        secret_access_key: String,
    },

    /// GoDaddy credentials.
    #[serde(rename = "godaddy")]
    Godaddy {
        /// GoDaddy API key.
        api_key: String,
        /// GoDaddy API secret.
        api_secret: String,
    },

    /// Namecheap credentials.
    #[serde(rename = "namecheap")]
    Namecheap {
        /// Namecheap API user.
        api_user: String,
        /// Namecheap API key.
        api_key: String,
        /// Whitelisted client IP (required by the Namecheap API).
        client_ip: String,
    },
}

impl ProviderCredentials {
    /// Construct credentials from a `HashMap`, validating required fields.
    ///
    /// Useful for credentials stored in a flat key-value format.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError`] if a required field is missing or empty.
    pub fn from_map(
        provider: Provider,
        map: &HashMap<String, String>,
    ) -> Result<Self, CredentialValidationError> {
        match provider {
            Provider::Cloudflare => Ok(Self::Cloudflare {
                api_token: Self::get_required_field(provider, map, "apiToken", "API Token")?,
            }),
            Provider::Route53 => Ok(Self::Route53 {
                access_key_id: Self::get_required_field(
                    provider,
                    map,
                    "accessKeyId",
                    "Access Key ID",
                )?,
                secret_access_key: Self::get_required_field(
                    provider,
                    map,
                    "secretAccessKey",
                    "Secret Access Key",
                )?,
            }),
            Provider::Godaddy => Ok(Self::Godaddy {
                api_key: Self::get_required_field(provider, map, "apiKey", "API Key")?,
                api_secret: Self::get_required_field(provider, map, "apiSecret", "API Secret")?,
            }),
            Provider::Namecheap => Ok(Self::Namecheap {
                api_user: Self::get_required_field(provider, map, "apiUser", "API User")?,
                api_key: Self::get_required_field(provider, map, "apiKey", "API Key")?,
                client_ip: Self::get_required_field(provider, map, "clientIp", "Client IP")?,
            }),
        }
    }

    /// Fetch a required field from the map and verify it is not empty.
    fn get_required_field(
        provider: Provider,
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                provider,
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                provider,
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.clone()),
        }
    }

    /// Convert credentials to a `HashMap` for flat key-value storage.
    pub fn to_map(&self) -> HashMap<String, String> {
        match self {
            Self::Cloudflare { api_token } => [("apiToken".to_string(), api_token.clone())].into(),
            Self::Route53 {
                access_key_id,
                secret_access_key,
            } => [
                ("accessKeyId".to_string(), access_key_id.clone()),
                ("secretAccessKey".to_string(), secret_access_key.clone()),
            ]
            .into(),
            Self::Godaddy {
                api_key,
                api_secret,
            } => [
                ("apiKey".to_string(), api_key.clone()),
                ("apiSecret".to_string(), api_secret.clone()),
            ]
            .into(),
            Self::Namecheap {
                api_user,
                api_key,
                client_ip,
            } => [
                ("apiUser".to_string(), api_user.clone()),
                ("apiKey".to_string(), api_key.clone()),
                ("clientIp".to_string(), client_ip.clone()),
            ]
            .into(),
        }
    }

    /// Returns the [`Provider`] corresponding to this credential variant.
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            Self::Cloudflare { .. } => Provider::Cloudflare,
            Self::Route53 { .. } => Provider::Route53,
            Self::Godaddy { .. } => Provider::Godaddy,
            Self::Namecheap { .. } => Provider::Namecheap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // ---- Provider enum ----

    #[test]
    fn provider_from_str_known() {
        assert_eq!(Provider::from_str("cloudflare").unwrap(), Provider::Cloudflare);
        assert_eq!(Provider::from_str("ROUTE53").unwrap(), Provider::Route53);
        assert_eq!(Provider::from_str("aws_route53").unwrap(), Provider::Route53);
    }

    #[test]
    fn provider_from_str_unknown() {
        assert!(Provider::from_str("gandi").is_err());
    }

    #[test]
    fn provider_capabilities() {
        assert!(Provider::Cloudflare.supports(ProviderType::Dns));
        assert!(!Provider::Cloudflare.supports(ProviderType::Registrar));
        assert!(Provider::Godaddy.supports(ProviderType::Registrar));
        assert!(!Provider::Namecheap.supports(ProviderType::Dns));
    }

    #[test]
    fn provider_type_serde_uppercase() {
        let json = serde_json::to_string(&ProviderType::Registrar).unwrap();
        assert_eq!(json, "\"REGISTRAR\"");
        let back: ProviderType = serde_json::from_str("\"DNS\"").unwrap();
        assert_eq!(back, ProviderType::Dns);
    }

    // ---- Record types ----

    #[test]
    fn record_type_serde_uppercase() {
        let json = serde_json::to_string(&DnsRecordType::Aaaa).unwrap();
        assert_eq!(json, "\"AAAA\"");
        let back: DnsRecordType = serde_json::from_str("\"CNAME\"").unwrap();
        assert_eq!(back, DnsRecordType::Cname);
    }

    #[test]
    fn record_spec_from_record_preserves_fields() {
        let record = DnsRecord {
            id: "r1".to_string(),
            name: "example.com".to_string(),
            record_type: DnsRecordType::Mx,
            content: "mail.example.com".to_string(),
            ttl: 3600,
            priority: Some(10),
            proxied: false,
        };
        let spec = RecordSpec::from(&record);
        assert_eq!(spec.name, "example.com");
        assert_eq!(spec.record_type, DnsRecordType::Mx);
        assert_eq!(spec.content, "mail.example.com");
        assert_eq!(spec.priority, Some(10));
    }

    // ---- Credentials ----

    #[test]
    fn credentials_cloudflare_from_map() {
        let map: std::collections::HashMap<String, String> =
            [("apiToken".to_string(), "token-123".to_string())].into();
        let creds = ProviderCredentials::from_map(Provider::Cloudflare, &map).unwrap();
        assert!(matches!(
            creds,
            ProviderCredentials::Cloudflare { api_token } if api_token == "token-123"
        ));
    }

    #[test]
    fn credentials_missing_field() {
        let map = std::collections::HashMap::new();
        let result = ProviderCredentials::from_map(Provider::Godaddy, &map);
        assert!(matches!(
            result,
            Err(CredentialValidationError::MissingField { field, .. }) if field == "apiKey"
        ));
    }

    #[test]
    fn credentials_empty_field() {
        let map: std::collections::HashMap<String, String> = [
            ("apiUser".to_string(), "user".to_string()),
            ("apiKey".to_string(), "  ".to_string()),
            ("clientIp".to_string(), "1.2.3.4".to_string()),
        ]
        .into();
        let result = ProviderCredentials::from_map(Provider::Namecheap, &map);
        assert!(matches!(
            result,
            Err(CredentialValidationError::EmptyField { field, .. }) if field == "apiKey"
        ));
    }

    #[test]
    fn credentials_map_roundtrip() {
        let creds = ProviderCredentials::Route53 {
            access_key_id: "AKIA123".to_string(),
            secret_access_key: "secret".to_string(),
        };
        let map = creds.to_map();
        let back = ProviderCredentials::from_map(Provider::Route53, &map).unwrap();
        assert!(matches!(
            back,
            ProviderCredentials::Route53 { access_key_id, .. } if access_key_id == "AKIA123"
        ));
    }

    #[test]
    fn credentials_serde_tagged_by_provider() {
        let creds = ProviderCredentials::Godaddy {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
        };
        let json = serde_json::to_string(&creds).unwrap();
        assert!(json.contains("\"provider\":\"godaddy\""));
        assert!(json.contains("\"credentials\""));
    }

    #[test]
    fn credentials_provider_discriminant() {
        let creds = ProviderCredentials::Namecheap {
            api_user: "u".to_string(),
            api_key: "k".to_string(),
            client_ip: "1.2.3.4".to_string(),
        };
        assert_eq!(creds.provider(), Provider::Namecheap);
    }
}
