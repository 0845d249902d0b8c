//! Shared helpers for adapter implementations.

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;

use crate::error::{ProviderError, Result};
use crate::types::DnsRecordType;

type HmacSha256 = Hmac<Sha256>;

// ============ HTTP Client ============

/// Default connect timeout (seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build an HTTP client with explicit timeouts.
///
/// Every provider call is a suspension point with no completion guarantee;
/// the request timeout bounds it and surfaces as a retryable `Timeout` error.
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

// ============ Record type conversion ============

/// Parse a vendor record-type string into [`DnsRecordType`].
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Ok(DnsRecordType::A),
        "AAAA" => Ok(DnsRecordType::Aaaa),
        "CNAME" => Ok(DnsRecordType::Cname),
        "MX" => Ok(DnsRecordType::Mx),
        "TXT" => Ok(DnsRecordType::Txt),
        "NS" => Ok(DnsRecordType::Ns),
        "SRV" => Ok(DnsRecordType::Srv),
        "CAA" => Ok(DnsRecordType::Caa),
        _ => Err(ProviderError::UnsupportedRecordType {
            provider: provider.to_string(),
            record_type: record_type.to_string(),
        }),
    }
}

/// Convert a [`DnsRecordType`] to its uppercase wire string.
pub fn record_type_to_string(record_type: DnsRecordType) -> &'static str {
    match record_type {
        DnsRecordType::A => "A",
        DnsRecordType::Aaaa => "AAAA",
        DnsRecordType::Cname => "CNAME",
        DnsRecordType::Mx => "MX",
        DnsRecordType::Txt => "TXT",
        DnsRecordType::Ns => "NS",
        DnsRecordType::Srv => "SRV",
        DnsRecordType::Caa => "CAA",
    }
}

// ============ HMAC-SHA256 ============

/// HMAC-SHA256 digest (used by the Route53 request signer).
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_record_types() {
        assert_eq!(parse_record_type("a", "t").unwrap(), DnsRecordType::A);
        assert_eq!(parse_record_type("TXT", "t").unwrap(), DnsRecordType::Txt);
        assert_eq!(parse_record_type("Mx", "t").unwrap(), DnsRecordType::Mx);
    }

    #[test]
    fn parse_unknown_record_type() {
        let result = parse_record_type("LOC", "t");
        assert!(matches!(
            result,
            Err(ProviderError::UnsupportedRecordType { record_type, .. }) if record_type == "LOC"
        ));
    }

    #[test]
    fn record_type_string_roundtrip() {
        for rt in [
            DnsRecordType::A,
            DnsRecordType::Aaaa,
            DnsRecordType::Cname,
            DnsRecordType::Mx,
            DnsRecordType::Txt,
            DnsRecordType::Ns,
            DnsRecordType::Srv,
            DnsRecordType::Caa,
        ] {
            let s = record_type_to_string(rt);
            assert_eq!(parse_record_type(s, "t").unwrap(), rt);
        }
    }

    #[test]
    fn hmac_sha256_deterministic() {
        let a = hmac_sha256(b"key", b"data");
        let b = hmac_sha256(b"key", b"data");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        let c = hmac_sha256(b"other-key", b"data");
        assert_ne!(a, c);
    }
}
