//! Challenge token generation and well-known challenge locations.

use rand::distr::Alphanumeric;
use rand::Rng;

const TOKEN_LEN: usize = 32;

/// Random alphanumeric token published as proof of domain control.
#[must_use]
pub fn generate_verification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Six digit code for email verification.
#[must_use]
pub fn generate_email_code() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:06}")
}

/// Owner name of the TXT record that must carry the verification token.
#[must_use]
pub fn txt_record_name(domain: &str) -> String {
    format!("_orbithost-verify.{domain}")
}

/// Well-known HTTP path that must serve the verification token.
#[must_use]
pub fn http_challenge_path(token: &str) -> String {
    format!("/.well-known/orbithost-verify/{token}")
}
