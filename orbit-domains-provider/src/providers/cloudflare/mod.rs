//! Cloudflare DNS adapter

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::create_http_client;
use crate::types::ProviderCredentials;

pub(crate) use types::{CloudflareDnsRecord, CloudflareRecordPayload, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare Zones API page size ceiling.
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API page size ceiling.
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;

/// Cloudflare DNS adapter.
///
/// Stateless: the API token travels with every call inside
/// [`ProviderCredentials::Cloudflare`].
pub struct CloudflareAdapter {
    pub(crate) client: Client,
}

impl CloudflareAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
        }
    }

    /// Extract the API token, rejecting credential variants for other vendors.
    pub(crate) fn token<'a>(&self, credentials: &'a ProviderCredentials) -> Result<&'a str> {
        match credentials {
            ProviderCredentials::Cloudflare { api_token } => Ok(api_token),
            other => Err(ProviderError::InvalidCredentials {
                provider: "cloudflare".to_string(),
                raw_message: Some(format!(
                    "expected cloudflare credentials, got {}",
                    other.provider()
                )),
            }),
        }
    }
}

impl Default for CloudflareAdapter {
    fn default() -> Self {
        Self::new()
    }
}
