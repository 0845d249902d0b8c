//! DNS resolution port for TXT challenge checks.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;

use crate::error::{CoreError, CoreResult};

/// Looks up TXT records for ownership challenges.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// All TXT strings published at `name`. An empty vector means the name
    /// resolved but carries no TXT data; resolution failures (including
    /// NXDOMAIN) are errors.
    async fn lookup_txt(&self, name: &str) -> CoreResult<Vec<String>>;
}

/// Resolver backed by the host system DNS configuration.
///
/// Falls back to Hickory's default upstream set (Google Public DNS) when
/// the system configuration cannot be loaded.
pub struct SystemDnsResolver {
    resolver: TokioResolver,
}

impl SystemDnsResolver {
    /// Build a resolver from the system configuration.
    #[must_use]
    pub fn new() -> Self {
        #[cfg(any(unix, target_os = "windows"))]
        {
            match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    return Self {
                        resolver: builder.build(),
                    };
                }
                Err(e) => {
                    log::warn!(
                        "Failed to load system DNS configuration, falling back to defaults: {e}"
                    );
                }
            }
        }

        let provider = TokioConnectionProvider::default();
        Self {
            resolver: TokioResolver::builder_with_config(ResolverConfig::default(), provider)
                .with_options(ResolverOpts::default())
                .build(),
        }
    }
}

impl Default for SystemDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for SystemDnsResolver {
    async fn lookup_txt(&self, name: &str) -> CoreResult<Vec<String>> {
        let response = self
            .resolver
            .txt_lookup(name)
            .await
            .map_err(|e| CoreError::ValidationError(format!("TXT lookup for {name} failed: {e}")))?;

        Ok(response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|data| String::from_utf8_lossy(data).to_string())
                    .collect::<String>()
            })
            .collect())
    }
}
