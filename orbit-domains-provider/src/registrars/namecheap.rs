//! Namecheap registrar adapter

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::providers::common::create_http_client;
use crate::providers::xml::{extract_attr, extract_tag, tag_blocks};
use crate::traits::{
    ErrorContext, ProviderErrorMapper, RawApiError, RegistrarAdapter,
};
use crate::types::{
    ContactInfo, DomainAvailability, DomainDetails, DomainSearchResult, NameserverUpdate,
    ProviderCredentials, RegistrationRequest, RegistrationResult,
};

const NAMECHEAP_API_BASE: &str = "https://api.namecheap.com/xml.response";
const DEFAULT_SEARCH_TLDS: &[&str] = &["com", "net", "org", "io", "dev"];

/// Namecheap registrar adapter.
///
/// The whole API is `GET` against a single endpoint with a `Command`
/// parameter; responses are XML with a `Status` attribute on the envelope.
///
/// Stateless: the API user, key and whitelisted client IP travel with every
/// call inside [`ProviderCredentials::Namecheap`].
pub struct NamecheapAdapter {
    client: Client,
}

/// Credential triple extracted per call.
struct NamecheapKeys<'a> {
    api_user: &'a str,
    api_key: &'a str,
    client_ip: &'a str,
}

impl NamecheapAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
        }
    }

    fn keys<'a>(&self, credentials: &'a ProviderCredentials) -> Result<NamecheapKeys<'a>> {
        match credentials {
            ProviderCredentials::Namecheap {
                api_user,
                api_key,
                client_ip,
            } => Ok(NamecheapKeys {
                api_user,
                api_key,
                client_ip,
            }),
            other => Err(ProviderError::InvalidCredentials {
                provider: "namecheap".to_string(),
                raw_message: Some(format!(
                    "expected namecheap credentials, got {}",
                    other.provider()
                )),
            }),
        }
    }

    /// Execute one API command and return the XML body of an `OK` response.
    async fn command(
        &self,
        keys: &NamecheapKeys<'_>,
        command: &str,
        params: &[(&str, &str)],
        context: ErrorContext,
    ) -> Result<String> {
        let mut query = format!(
            "ApiUser={}&ApiKey={}&UserName={}&ClientIp={}&Command={command}",
            urlencoding::encode(keys.api_user),
            urlencoding::encode(keys.api_key),
            urlencoding::encode(keys.api_user),
            urlencoding::encode(keys.client_ip),
        );
        for (name, value) in params {
            query.push_str(&format!("&{name}={}", urlencoding::encode(value)));
        }
        let url = format!("{NAMECHEAP_API_BASE}?{query}");

        let builder = self.client.request(Method::GET, &url);
        // The API key is in the query string; log the command only
        let (_status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), "GET", command).await?;

        let envelope_status = tag_blocks(&text, "ApiResponse")
            .first()
            .and_then(|block| extract_attr(block, "Status"))
            .ok_or_else(|| self.parse_error("missing ApiResponse envelope"))?;

        if envelope_status.eq_ignore_ascii_case("ERROR") {
            let raw = tag_blocks(&text, "Error")
                .first()
                .map_or_else(
                    || RawApiError::new("unknown API error"),
                    |error| {
                        let message = extract_tag(error, "Error")
                            .unwrap_or_else(|| "unknown API error".to_string());
                        match extract_attr(error, "Number") {
                            Some(number) => RawApiError::with_code(number, message),
                            None => RawApiError::new(message),
                        }
                    },
                );
            let err = self.map_error(raw, context);
            if err.is_expected() {
                log::warn!("[namecheap] API error: {err}");
            } else {
                log::error!("[namecheap] API error: {err}");
            }
            return Err(err);
        }

        Ok(text)
    }

    /// Split a domain into the `SLD`/`TLD` pair the API expects.
    fn split_domain(domain: &str) -> Result<(&str, &str)> {
        domain
            .split_once('.')
            .filter(|(sld, tld)| !sld.is_empty() && !tld.is_empty())
            .ok_or_else(|| ProviderError::InvalidParameter {
                provider: "namecheap".to_string(),
                param: "domain".to_string(),
                detail: format!("'{domain}' is not a registrable domain name"),
            })
    }

    fn parse_check_result(block: &str) -> Option<DomainAvailability> {
        let domain = extract_attr(block, "Domain")?;
        let available = extract_attr(block, "Available")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let premium = extract_attr(block, "IsPremiumName")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let price = if premium {
            extract_attr(block, "PremiumRegistrationPrice").and_then(|p| p.parse().ok())
        } else {
            None
        };
        Some(DomainAvailability {
            domain,
            available,
            price,
            currency: price.map(|_| "USD".to_string()),
        })
    }

    /// Flatten a contact into the per-role parameter set the create command
    /// requires. The same contact fills all four roles.
    fn contact_params(contact: &ContactInfo) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for role in ["Registrant", "Tech", "Admin", "AuxBilling"] {
            params.push((format!("{role}FirstName"), contact.first_name.clone()));
            params.push((format!("{role}LastName"), contact.last_name.clone()));
            params.push((format!("{role}Address1"), contact.address1.clone()));
            params.push((format!("{role}City"), contact.city.clone()));
            params.push((format!("{role}StateProvince"), contact.state.clone()));
            params.push((format!("{role}PostalCode"), contact.postal_code.clone()));
            params.push((format!("{role}Country"), contact.country.clone()));
            params.push((format!("{role}Phone"), contact.phone.clone()));
            params.push((format!("{role}EmailAddress"), contact.email.clone()));
        }
        params
    }
}

impl Default for NamecheapAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Namecheap error number mapping
/// Reference: <https://www.namecheap.com/support/api/error-codes/>
impl ProviderErrorMapper for NamecheapAdapter {
    fn provider_name(&self) -> &'static str {
        "namecheap"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let domain = || context.domain.clone().unwrap_or_else(|| "<unknown>".to_string());
        match raw.code.as_deref() {
            // 1010101/1010104: ApiUser or ApiKey invalid
            // 1011102: API key mismatch
            // 1011147: IP not whitelisted
            // 1011150: unknown ClientIp
            Some("1010101" | "1010104" | "1011102" | "1011147" | "1011150") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // 2016166: domain is not associated with this account
            Some("2016166") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // 2019166/5019169: domain not found
            Some("2019166" | "5019169") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: domain(),
                raw_message: Some(raw.message),
            },

            // 2030280: TLD not supported
            // 2033409: domain is taken
            Some("2030280" | "2033409") => ProviderError::DomainUnavailable {
                provider: self.provider_name().to_string(),
                domain: domain(),
                raw_message: Some(raw.message),
            },

            // 2030166: domain is locked
            Some("2030166") => ProviderError::DomainLocked {
                provider: self.provider_name().to_string(),
                domain: domain(),
                raw_message: Some(raw.message),
            },

            // 2010324/2030324: invalid nameserver list
            Some("2010324" | "2030324") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "nameservers".to_string(),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[async_trait]
impl RegistrarAdapter for NamecheapAdapter {
    fn id(&self) -> &'static str {
        "namecheap"
    }

    async fn check_availability(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainAvailability> {
        let keys = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let xml = self
            .command(
                &keys,
                "namecheap.domains.check",
                &[("DomainList", domain)],
                context,
            )
            .await?;
        tag_blocks(&xml, "DomainCheckResult")
            .first()
            .and_then(|block| Self::parse_check_result(block))
            .ok_or_else(|| self.parse_error("missing DomainCheckResult element"))
    }

    async fn search_domains(
        &self,
        credentials: &ProviderCredentials,
        keyword: &str,
        tlds: Option<&[String]>,
    ) -> Result<Vec<DomainSearchResult>> {
        let keys = self.keys(credentials)?;
        // There is no suggest API; probe the keyword across TLDs in one
        // batched check call.
        let candidates: Vec<String> = match tlds {
            Some(tlds) if !tlds.is_empty() => tlds
                .iter()
                .map(|tld| format!("{keyword}.{}", tld.trim_start_matches('.')))
                .collect(),
            _ => DEFAULT_SEARCH_TLDS
                .iter()
                .map(|tld| format!("{keyword}.{tld}"))
                .collect(),
        };
        let domain_list = candidates.join(",");
        let xml = self
            .command(
                &keys,
                "namecheap.domains.check",
                &[("DomainList", &domain_list)],
                ErrorContext::default(),
            )
            .await?;
        Ok(tag_blocks(&xml, "DomainCheckResult")
            .into_iter()
            .filter_map(Self::parse_check_result)
            .map(|a| DomainSearchResult {
                domain: a.domain,
                available: a.available,
                price: a.price,
            })
            .collect())
    }

    async fn register_domain(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResult> {
        let keys = self.keys(credentials)?;
        let contact = request.contact.as_ref().ok_or_else(|| {
            ProviderError::InvalidParameter {
                provider: "namecheap".to_string(),
                param: "contact".to_string(),
                detail: "registrant contact is required".to_string(),
            }
        })?;

        let years = request.years.to_string();
        let mut params: Vec<(String, String)> = vec![
            ("DomainName".to_string(), domain.to_string()),
            ("Years".to_string(), years),
            (
                "AddFreeWhoisguard".to_string(),
                "yes".to_string(),
            ),
        ];
        params.extend(Self::contact_params(contact));
        if let Some(nameservers) = &request.nameservers {
            params.push(("Nameservers".to_string(), nameservers.join(",")));
        }
        let params_ref: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let xml = self
            .command(&keys, "namecheap.domains.create", &params_ref, context)
            .await?;

        let result = tag_blocks(&xml, "DomainCreateResult")
            .first()
            .map(|block| {
                let registered = extract_attr(block, "Registered")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true"));
                let order_id = extract_attr(block, "OrderID");
                (registered, order_id)
            })
            .ok_or_else(|| self.parse_error("missing DomainCreateResult element"))?;

        Ok(RegistrationResult {
            domain: domain.to_string(),
            order_id: result.1,
            status: if result.0 {
                "completed".to_string()
            } else {
                "pending".to_string()
            },
        })
    }

    async fn get_domain_details(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainDetails> {
        let keys = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let xml = self
            .command(
                &keys,
                "namecheap.domains.getInfo",
                &[("DomainName", domain)],
                context,
            )
            .await?;

        let info = tag_blocks(&xml, "DomainGetInfoResult")
            .first()
            .copied()
            .map(str::to_string)
            .ok_or_else(|| self.parse_error("missing DomainGetInfoResult element"))?;

        let status = extract_attr(&info, "Status")
            .unwrap_or_else(|| "unknown".to_string())
            .to_lowercase();
        let created_at = extract_tag(&info, "CreatedDate");
        let expires_at = extract_tag(&info, "ExpiredDate");
        let nameservers = tag_blocks(&info, "Nameserver")
            .into_iter()
            .filter_map(|b| extract_tag(b, "Nameserver"))
            .collect();

        Ok(DomainDetails {
            domain: domain.to_string(),
            status,
            created_at,
            expires_at,
            nameservers,
            locked: false,
            auto_renew: extract_attr(&info, "IsAutoRenew")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        })
    }

    async fn update_nameservers(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        nameservers: &[String],
    ) -> Result<NameserverUpdate> {
        let keys = self.keys(credentials)?;
        let (sld, tld) = Self::split_domain(domain)?;
        let joined = nameservers.join(",");
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let xml = self
            .command(
                &keys,
                "namecheap.domains.dns.setCustom",
                &[("SLD", sld), ("TLD", tld), ("Nameservers", &joined)],
                context,
            )
            .await?;

        let updated = tag_blocks(&xml, "DomainDNSSetCustomResult")
            .first()
            .and_then(|block| extract_attr(block, "Updated"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if !updated {
            return Err(ProviderError::Unknown {
                provider: "namecheap".to_string(),
                raw_code: None,
                raw_message: format!("nameserver update for '{domain}' was not applied"),
            });
        }

        Ok(NameserverUpdate {
            domain: domain.to_string(),
            nameservers: nameservers.to_vec(),
        })
    }

    async fn verify_credential(&self, credentials: &ProviderCredentials) -> Result<bool> {
        let keys = self.keys(credentials)?;
        let result = self
            .command(
                &keys,
                "namecheap.domains.getList",
                &[("Page", "1"), ("PageSize", "10")],
                ErrorContext::default(),
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                log::warn!("[namecheap] credential check failed: {e}");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> NamecheapAdapter {
        NamecheapAdapter::new()
    }

    #[test]
    fn split_domain_basic() {
        assert_eq!(
            NamecheapAdapter::split_domain("example.com").unwrap(),
            ("example", "com")
        );
        // Multi-part TLDs keep everything after the first dot
        assert_eq!(
            NamecheapAdapter::split_domain("example.co.uk").unwrap(),
            ("example", "co.uk")
        );
    }

    #[test]
    fn split_domain_rejects_bare_label() {
        assert!(matches!(
            NamecheapAdapter::split_domain("localhost"),
            Err(ProviderError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn parse_check_result_available() {
        let block = r#"<DomainCheckResult Domain="example.dev" Available="true" IsPremiumName="false"/>"#;
        let result = NamecheapAdapter::parse_check_result(block).unwrap();
        assert_eq!(result.domain, "example.dev");
        assert!(result.available);
        assert!(result.price.is_none());
    }

    #[test]
    fn parse_check_result_premium_price() {
        let block = r#"<DomainCheckResult Domain="hot.com" Available="true" IsPremiumName="true" PremiumRegistrationPrice="2500.00"/>"#;
        let result = NamecheapAdapter::parse_check_result(block).unwrap();
        assert_eq!(result.price, Some(2500.0));
        assert_eq!(result.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn contact_params_cover_all_roles() {
        let contact = ContactInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+1.5555550100".to_string(),
            address1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "OR".to_string(),
            postal_code: "97000".to_string(),
            country: "US".to_string(),
        };
        let params = NamecheapAdapter::contact_params(&contact);
        assert_eq!(params.len(), 4 * 9);
        assert!(params.iter().any(|(k, v)| k == "RegistrantEmailAddress" && v == "ada@example.com"));
        assert!(params.iter().any(|(k, _)| k == "AuxBillingFirstName"));
    }

    #[test]
    fn auth_error_numbers_map_to_invalid_credentials() {
        let a = adapter();
        for code in ["1010104", "1011102", "1011150"] {
            let err = a.map_error(
                RawApiError::with_code(code, "auth"),
                ErrorContext::default(),
            );
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code} should map to InvalidCredentials"
            );
        }
    }

    #[test]
    fn domain_not_found_2019166() {
        let a = adapter();
        let context = ErrorContext {
            domain: Some("example.com".to_string()),
            ..ErrorContext::default()
        };
        let err = a.map_error(RawApiError::with_code("2019166", "not found"), context);
        assert!(matches!(
            err,
            ProviderError::DomainNotFound { domain, .. } if domain == "example.com"
        ));
    }

    #[test]
    fn keys_reject_foreign_credentials() {
        let a = adapter();
        let creds = ProviderCredentials::Route53 {
            access_key_id: "ak".to_string(),
            secret_access_key: "sk".to_string(),
        };
        assert!(matches!(
            a.keys(&creds),
            Err(ProviderError::InvalidCredentials { .. })
        ));
    }
}
