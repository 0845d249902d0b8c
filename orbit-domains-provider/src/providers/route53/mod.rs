//! Amazon Route 53 DNS adapter

mod error;
mod provider;
mod sign;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::create_http_client;
use crate::types::ProviderCredentials;

pub(crate) const R53_API_BASE: &str = "https://route53.amazonaws.com";
pub(crate) const R53_API_VERSION: &str = "2013-04-01";
/// Route 53 list APIs page size ceiling.
pub(crate) const MAX_ITEMS: u32 = 100;

/// Amazon Route 53 DNS adapter.
///
/// Stateless: the access key pair travels with every call inside
/// [`ProviderCredentials::Route53`].
pub struct Route53Adapter {
    pub(crate) client: Client,
}

impl Route53Adapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
        }
    }

    /// Extract the access key pair, rejecting credential variants for other vendors.
    pub(crate) fn keys<'a>(
        &self,
        credentials: &'a ProviderCredentials,
    ) -> Result<(&'a str, &'a str)> {
        match credentials {
            ProviderCredentials::Route53 {
                access_key_id,
                secret_access_key,
            } => Ok((access_key_id, secret_access_key)),
            other => Err(ProviderError::InvalidCredentials {
                provider: "route53".to_string(),
                raw_message: Some(format!(
                    "expected route53 credentials, got {}",
                    other.provider()
                )),
            }),
        }
    }
}

impl Default for Route53Adapter {
    fn default() -> Self {
        Self::new()
    }
}
