//! Route 53 error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::Route53Adapter;

/// Route 53 error code mapping
/// Reference: <https://docs.aws.amazon.com/Route53/latest/APIReference/CommonErrors.html>
impl ProviderErrorMapper for Route53Adapter {
    fn provider_name(&self) -> &'static str {
        "route53"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // Authentication failures
            Some(
                "InvalidClientTokenId"
                | "SignatureDoesNotMatch"
                | "AuthFailure"
                | "MissingAuthenticationToken"
                | "InvalidAccessKeyId"
                | "UnrecognizedClientException",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("AccessDenied" | "AccessDeniedException") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // PriorRequestNotComplete asks the caller to back off and retry
            Some("Throttling" | "ThrottlingException" | "PriorRequestNotComplete") => {
                ProviderError::RateLimited {
                    provider: self.provider_name().to_string(),
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            Some("NoSuchHostedZone") => ProviderError::ZoneNotFound {
                provider: self.provider_name().to_string(),
                zone_id: context.zone_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // A change batch is rejected as a whole. The message text is the
            // only discriminator between a duplicate CREATE and a DELETE of a
            // missing record.
            Some("InvalidChangeBatch") => {
                let lower = raw.message.to_lowercase();
                if lower.contains("already exists") {
                    ProviderError::RecordExists {
                        provider: self.provider_name().to_string(),
                        record_name: context
                            .record_name
                            .unwrap_or_else(|| "<unknown>".to_string()),
                        raw_message: Some(raw.message),
                    }
                } else if lower.contains("not found") || lower.contains("does not exist") {
                    ProviderError::RecordNotFound {
                        provider: self.provider_name().to_string(),
                        record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                        raw_message: Some(raw.message),
                    }
                } else {
                    ProviderError::InvalidParameter {
                        provider: self.provider_name().to_string(),
                        param: "change_batch".to_string(),
                        detail: raw.message,
                    }
                }
            }

            Some("InvalidInput" | "InvalidDomainName") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "general".to_string(),
                detail: raw.message,
            },

            Some("TooManyResourceRecordSets" | "LimitsExceeded") => {
                ProviderError::QuotaExceeded {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

    fn adapter() -> Route53Adapter {
        Route53Adapter::new()
    }

    fn ctx() -> ErrorContext {
        ErrorContext::default()
    }

    #[test]
    fn auth_errors_map_to_invalid_credentials() {
        let a = adapter();
        for code in [
            "InvalidClientTokenId",
            "SignatureDoesNotMatch",
            "AuthFailure",
            "MissingAuthenticationToken",
        ] {
            let err = a.map_error(RawApiError::with_code(code, "denied"), ctx());
            assert!(
                matches!(err, ProviderError::InvalidCredentials { .. }),
                "code {code} should map to InvalidCredentials"
            );
        }
    }

    #[test]
    fn access_denied_maps_to_permission_denied() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("AccessDenied", "no policy"), ctx());
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
    }

    #[test]
    fn throttling_maps_to_rate_limited() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("PriorRequestNotComplete", "try again"),
            ctx(),
        );
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn no_such_hosted_zone() {
        let a = adapter();
        let context = ErrorContext {
            zone_id: Some("Z123".to_string()),
            ..ErrorContext::default()
        };
        let err = a.map_error(
            RawApiError::with_code("NoSuchHostedZone", "no zone"),
            context,
        );
        assert!(matches!(
            err,
            ProviderError::ZoneNotFound { zone_id, .. } if zone_id == "Z123"
        ));
    }

    #[test]
    fn invalid_change_batch_duplicate_create() {
        let a = adapter();
        let context = ErrorContext {
            record_name: Some("www.example.com".to_string()),
            ..ErrorContext::default()
        };
        let err = a.map_error(
            RawApiError::with_code(
                "InvalidChangeBatch",
                "Tried to create resource record set [name='www.example.com.', type='A'] but it already exists",
            ),
            context,
        );
        assert!(matches!(
            err,
            ProviderError::RecordExists { record_name, .. } if record_name == "www.example.com"
        ));
    }

    #[test]
    fn invalid_change_batch_missing_delete() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code(
                "InvalidChangeBatch",
                "Tried to delete resource record set but it was not found",
            ),
            ctx(),
        );
        assert!(matches!(err, ProviderError::RecordNotFound { .. }));
    }

    #[test]
    fn invalid_change_batch_other() {
        let a = adapter();
        let err = a.map_error(
            RawApiError::with_code("InvalidChangeBatch", "TTL out of range"),
            ctx(),
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "change_batch"
        ));
    }

    #[test]
    fn fallback_unknown_code() {
        let a = adapter();
        let err = a.map_error(RawApiError::with_code("ServiceUnavailable", "oops"), ctx());
        assert!(matches!(err, ProviderError::Unknown { .. }));
    }
}
