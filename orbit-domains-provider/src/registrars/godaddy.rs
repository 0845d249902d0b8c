//! GoDaddy registrar adapter

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use serde::Deserialize;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::providers::common::create_http_client;
use crate::traits::{
    ErrorContext, ProviderErrorMapper, RawApiError, RegistrarAdapter,
};
use crate::types::{
    DomainAvailability, DomainDetails, DomainSearchResult, NameserverUpdate,
    ProviderCredentials, RegistrationRequest, RegistrationResult,
};

const GODADDY_API_BASE: &str = "https://api.godaddy.com";

/// GoDaddy registrar adapter.
///
/// Stateless: the key pair travels with every call inside
/// [`ProviderCredentials::Godaddy`].
pub struct GodaddyAdapter {
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GodaddyErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GodaddyAvailability {
    domain: String,
    available: bool,
    /// Price in micro-units of `currency` (1_000_000 == 1 unit).
    price: Option<u64>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GodaddySuggestion {
    domain: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GodaddyPurchaseReceipt {
    order_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GodaddyDomain {
    domain: String,
    status: String,
    created_at: Option<String>,
    expires: Option<String>,
    #[serde(default)]
    name_servers: Option<Vec<String>>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    renew_auto: bool,
}

impl GodaddyAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
        }
    }

    /// Extract the key pair, rejecting credential variants for other vendors.
    fn keys<'a>(&self, credentials: &'a ProviderCredentials) -> Result<(&'a str, &'a str)> {
        match credentials {
            ProviderCredentials::Godaddy {
                api_key,
                api_secret,
            } => Ok((api_key, api_secret)),
            other => Err(ProviderError::InvalidCredentials {
                provider: "godaddy".to_string(),
                raw_message: Some(format!(
                    "expected godaddy credentials, got {}",
                    other.provider()
                )),
            }),
        }
    }

    async fn send(
        &self,
        api_key: &str,
        api_secret: &str,
        method: Method,
        path_and_query: &str,
        body: Option<serde_json::Value>,
        context: ErrorContext,
    ) -> Result<String> {
        let url = format!("{GODADDY_API_BASE}{path_and_query}");
        let method_name = method.as_str().to_string();

        let mut builder = self
            .client
            .request(method, &url)
            .header("Authorization", format!("sso-key {api_key}:{api_secret}"));
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let (status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), &method_name, &url).await?;

        if !(200..300).contains(&status) {
            let raw = match serde_json::from_str::<GodaddyErrorBody>(&text) {
                Ok(GodaddyErrorBody {
                    code: Some(code),
                    message,
                }) => RawApiError::with_code(
                    code,
                    message.unwrap_or_else(|| format!("HTTP {status}")),
                ),
                _ => RawApiError::new(format!("HTTP {status}: {text}")),
            };
            let err = self.map_error(raw, context);
            if err.is_expected() {
                log::warn!("[godaddy] API error: {err}");
            } else {
                log::error!("[godaddy] API error: {err}");
            }
            return Err(err);
        }

        Ok(text)
    }

    fn micros_to_price(micros: Option<u64>) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        micros.map(|m| m as f64 / 1_000_000.0)
    }

    fn purchase_body(domain: &str, request: &RegistrationRequest) -> serde_json::Value {
        let contact = request.contact.as_ref().map(|c| {
            serde_json::json!({
                "nameFirst": c.first_name,
                "nameLast": c.last_name,
                "email": c.email,
                "phone": c.phone,
                "addressMailing": {
                    "address1": c.address1,
                    "city": c.city,
                    "state": c.state,
                    "postalCode": c.postal_code,
                    "country": c.country,
                },
            })
        });

        let mut body = serde_json::json!({
            "domain": domain,
            "period": request.years,
            "renewAuto": request.auto_renew,
            "privacy": false,
            "consent": {
                "agreementKeys": ["DNRA"],
                "agreedBy": contact
                    .as_ref()
                    .and_then(|c| c.get("email"))
                    .cloned()
                    .unwrap_or_else(|| serde_json::Value::String("api".to_string())),
                "agreedAt": Utc::now().to_rfc3339(),
            },
        });
        if let Some(contact) = contact {
            body["contactRegistrant"] = contact.clone();
            body["contactAdmin"] = contact.clone();
            body["contactTech"] = contact.clone();
            body["contactBilling"] = contact;
        }
        if let Some(nameservers) = &request.nameservers {
            body["nameServers"] = serde_json::json!(nameservers);
        }
        body
    }
}

impl Default for GodaddyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// GoDaddy error code mapping
/// Reference: <https://developer.godaddy.com/doc/endpoint/domains>
impl ProviderErrorMapper for GodaddyAdapter {
    fn provider_name(&self) -> &'static str {
        "godaddy"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let domain = || context.domain.clone().unwrap_or_else(|| "<unknown>".to_string());
        match raw.code.as_deref() {
            Some("UNABLE_TO_AUTHENTICATE" | "AUTHENTICATION_FAILED" | "INVALID_SHOPPER_ID") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            Some("ACCESS_DENIED" | "FORBIDDEN") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("NOT_FOUND" | "UNKNOWN_DOMAIN") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: domain(),
                raw_message: Some(raw.message),
            },

            Some("UNAVAILABLE_DOMAIN" | "UNSUPPORTED_TLD" | "UNPURCHASABLE_DOMAIN") => {
                ProviderError::DomainUnavailable {
                    provider: self.provider_name().to_string(),
                    domain: domain(),
                    raw_message: Some(raw.message),
                }
            }

            Some("DOMAIN_LOCKED") => ProviderError::DomainLocked {
                provider: self.provider_name().to_string(),
                domain: domain(),
                raw_message: Some(raw.message),
            },

            Some(
                code @ ("INVALID_BODY" | "INVALID_FORMAT" | "INVALID_VALUE_ENUM"
                | "MALFORMED_DOMAIN_NAME"),
            ) => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: if code == "MALFORMED_DOMAIN_NAME" {
                    "domain".to_string()
                } else {
                    "general".to_string()
                },
                detail: raw.message,
            },

            Some("RATE_LIMITED" | "TOO_MANY_REQUESTS") => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[async_trait]
impl RegistrarAdapter for GodaddyAdapter {
    fn id(&self) -> &'static str {
        "godaddy"
    }

    async fn check_availability(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainAvailability> {
        let (key, secret) = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let text = self
            .send(
                key,
                secret,
                Method::GET,
                &format!(
                    "/v1/domains/available?domain={}",
                    urlencoding::encode(domain)
                ),
                None,
                context,
            )
            .await?;
        let availability: GodaddyAvailability =
            HttpUtils::parse_json(&text, self.provider_name())?;
        Ok(DomainAvailability {
            domain: availability.domain,
            available: availability.available,
            price: Self::micros_to_price(availability.price),
            currency: availability.currency,
        })
    }

    async fn search_domains(
        &self,
        credentials: &ProviderCredentials,
        keyword: &str,
        tlds: Option<&[String]>,
    ) -> Result<Vec<DomainSearchResult>> {
        let (key, secret) = self.keys(credentials)?;
        let mut path = format!(
            "/v1/domains/suggest?query={}&limit=20",
            urlencoding::encode(keyword)
        );
        if let Some(tlds) = tlds {
            if !tlds.is_empty() {
                path.push_str(&format!("&tlds={}", urlencoding::encode(&tlds.join(","))));
            }
        }
        let text = self
            .send(key, secret, Method::GET, &path, None, ErrorContext::default())
            .await?;
        let suggestions: Vec<GodaddySuggestion> =
            HttpUtils::parse_json(&text, self.provider_name())?;
        // The suggest endpoint only returns registrable names
        Ok(suggestions
            .into_iter()
            .map(|s| DomainSearchResult {
                domain: s.domain,
                available: true,
                price: None,
            })
            .collect())
    }

    async fn register_domain(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResult> {
        let (key, secret) = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let text = self
            .send(
                key,
                secret,
                Method::POST,
                "/v1/domains/purchase",
                Some(Self::purchase_body(domain, request)),
                context,
            )
            .await?;
        let receipt: GodaddyPurchaseReceipt = HttpUtils::parse_json(&text, self.provider_name())?;
        Ok(RegistrationResult {
            domain: domain.to_string(),
            order_id: receipt.order_id.map(|id| id.to_string()),
            status: "pending".to_string(),
        })
    }

    async fn get_domain_details(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
    ) -> Result<DomainDetails> {
        let (key, secret) = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        let text = self
            .send(
                key,
                secret,
                Method::GET,
                &format!("/v1/domains/{}", urlencoding::encode(domain)),
                None,
                context,
            )
            .await?;
        let details: GodaddyDomain = HttpUtils::parse_json(&text, self.provider_name())?;
        Ok(DomainDetails {
            domain: details.domain,
            status: details.status.to_lowercase(),
            created_at: details.created_at,
            expires_at: details.expires,
            nameservers: details.name_servers.unwrap_or_default(),
            locked: details.locked,
            auto_renew: details.renew_auto,
        })
    }

    async fn update_nameservers(
        &self,
        credentials: &ProviderCredentials,
        domain: &str,
        nameservers: &[String],
    ) -> Result<NameserverUpdate> {
        let (key, secret) = self.keys(credentials)?;
        let context = ErrorContext {
            domain: Some(domain.to_string()),
            ..ErrorContext::default()
        };
        self.send(
            key,
            secret,
            Method::PATCH,
            &format!("/v1/domains/{}", urlencoding::encode(domain)),
            Some(serde_json::json!({ "nameServers": nameservers })),
            context,
        )
        .await?;
        Ok(NameserverUpdate {
            domain: domain.to_string(),
            nameservers: nameservers.to_vec(),
        })
    }

    async fn verify_credential(&self, credentials: &ProviderCredentials) -> Result<bool> {
        let (key, secret) = self.keys(credentials)?;
        let result = self
            .send(
                key,
                secret,
                Method::GET,
                "/v1/domains?limit=1",
                None,
                ErrorContext::default(),
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                log::warn!("[godaddy] credential check failed: {e}");
                Ok(false)
            }
        }
    }
}
