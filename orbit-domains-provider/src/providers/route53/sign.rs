//! AWS Signature Version 4 for the Route 53 endpoint

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::providers::common::hmac_sha256;
use crate::utils::log_sanitizer::truncate_for_log;

const SIGNING_REGION: &str = "us-east-1";
const SIGNING_SERVICE: &str = "route53";

/// Generate an AWS SigV4 `Authorization` header value.
///
/// `timestamp` is the `x-amz-date` value (`YYYYMMDDTHHMMSSZ`); the credential
/// scope date is its first eight characters. Route 53 is a global service,
/// always signed against `us-east-1`.
///
/// Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html>
pub(crate) fn sign_v4(
    access_key_id: &str,
    secret_access_key: &str,
    method: &str,
    uri: &str,
    query: &str,
    headers: &[(String, String)],
    payload: &str,
    timestamp: &str,
) -> String {
    // 1. Query string sorting (ascending by full pair)
    let canonical_query = if query.is_empty() {
        String::new()
    } else {
        let mut params: Vec<&str> = query.split('&').collect();
        params.sort_unstable();
        params.join("&")
    };

    // 2. Canonical headers, lowercase keys in ascending order
    let mut sorted_headers: Vec<_> = headers.iter().collect();
    sorted_headers.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let canonical_headers: String = sorted_headers
        .iter()
        .fold(String::new(), |mut acc, (k, v)| {
            let _ = writeln!(acc, "{}:{}", k.to_lowercase(), v.trim());
            acc
        });

    let signed_headers: String = sorted_headers
        .iter()
        .map(|(k, _)| k.to_lowercase())
        .collect::<Vec<_>>()
        .join(";");

    // 3. Payload hash
    let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));

    // 4. Canonical request
    let canonical_request = format!(
        "{method}\n{uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}"
    );

    log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

    // 5. String to sign with credential scope
    let date = &timestamp[..8];
    let scope = format!("{date}/{SIGNING_REGION}/{SIGNING_SERVICE}/aws4_request");
    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign =
        format!("AWS4-HMAC-SHA256\n{timestamp}\n{scope}\n{hashed_canonical_request}");

    log::debug!("StringToSign:\n{string_to_sign}");

    // 6. Derive the signing key through the HMAC chain
    let k_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        date.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, SIGNING_REGION.as_bytes());
    let k_service = hmac_sha256(&k_region, SIGNING_SERVICE.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");

    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    // 7. Authorization header
    format!(
        "AWS4-HMAC-SHA256 Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}
