//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareAdapter;

/// Cloudflare error code mapping
/// Reference: <https://api.cloudflare.com/#getting-started-responses>
impl ProviderErrorMapper for CloudflareAdapter {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // Authentication error
            // 6003: Invalid request headers
            // 6111: Invalid format for Authorization header
            // 9109: Unauthorized to access requested resource
            // 10000: Authentication error
            Some("6003" | "6103" | "6111" | "9109" | "10000") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // Invalid parameter
            // 1004: DNS Validation Error
            // 9000: Invalid or missing name
            // 9005/9006/9009: invalid record content
            // 9021: Invalid TTL
            // 9041: This DNS record cannot be proxied
            Some(code @ ("1004" | "9000" | "9005" | "9006" | "9009" | "9021" | "9041")) => {
                let param = match code {
                    "9000" => "name",
                    "9005" | "9006" | "9009" => "content",
                    "9021" => "ttl",
                    "9041" => "proxied",
                    // 1004 is a general validation error
                    _ => "general",
                };
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: param.to_string(),
                    detail: raw.message,
                }
            }

            // Record already exists
            // 81053-81058: conflicting record of some type already present
            Some("81053" | "81054" | "81055" | "81056" | "81057" | "81058") => {
                ProviderError::RecordExists {
                    provider: self.provider_name().to_string(),
                    record_name: context
                        .record_name
                        .unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }

            // 81044: Record does not exist
            Some("81044") => ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 81045: The record quota has been exceeded
            Some("81045") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Zone does not exist / bad route
            // 7000: No route for that URI
            // 7003: Could not route to path, object identifier invalid
            Some("7000" | "7003") => ProviderError::ZoneNotFound {
                provider: self.provider_name().to_string(),
                zone_id: context.zone_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // Other error fallback
            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

    fn adapter() -> CloudflareAdapter {
        CloudflareAdapter::new()
    }

    fn ctx() -> ErrorContext {
        ErrorContext::default()
    }

    fn ctx_full() -> ErrorContext {
        ErrorContext {
            record_name: Some("www".to_string()),
            record_id: Some("rec-123".to_string()),
            zone_id: Some("zone-1".to_string()),
            domain: Some("example.com".to_string()),
        }
    }

    #[test]
    fn auth_errors_map_to_invalid_credentials() {
        let a = adapter();
        for code in ["6003", "6111", "9109", "10000"] {
            let err = a.map_error(RawApiError::with_code(code, "auth failed"), ctx());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code} should map to InvalidCredentials"
            );
        }
    }

    #[test]
    fn invalid_param_9021_ttl() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("9021", "invalid TTL"), ctx());
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "ttl"
        ));
    }

    #[test]
    fn record_exists_81057() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("81057", "record already exists"),
            ctx_full(),
        );
        assert!(matches!(
            err,
            ProviderError::RecordExists { record_name, .. } if record_name == "www"
        ));
    }

    #[test]
    fn record_exists_default_context() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("81053", "conflict"), ctx());
        assert!(matches!(
            err,
            ProviderError::RecordExists { record_name, .. } if record_name == "<unknown>"
        ));
    }

    #[test]
    fn record_not_found_81044() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("81044", "record does not exist"),
            ctx_full(),
        );
        assert!(matches!(
            err,
            ProviderError::RecordNotFound { record_id, .. } if record_id == "rec-123"
        ));
    }

    #[test]
    fn quota_exceeded_81045() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("81045", "quota"), ctx());
        assert!(matches!(err, ProviderError::QuotaExceeded { .. }));
    }

    #[test]
    fn zone_not_found_7003() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("7003", "no route"), ctx_full());
        assert!(matches!(
            err,
            ProviderError::ZoneNotFound { zone_id, .. } if zone_id == "zone-1"
        ));
    }

    #[test]
    fn fallback_unknown_code() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("99999", "something odd"), ctx());
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code, raw_message, .. }
                if raw_code.as_deref() == Some("99999") && raw_message == "something odd"
        ));
    }

    #[test]
    fn fallback_no_code() {
        let a = adapter();
        let err = a.map_error(RawApiError::new("no code at all"), ctx());
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code: None, .. }
        ));
    }
}
