//! Adapter factory.
//!
//! Adapters are stateless singletons; one instance per vendor serves every
//! credential. The factory hands out fresh `Arc`s that registries can cache.

use std::sync::Arc;

use crate::providers::{CloudflareAdapter, Route53Adapter};
use crate::registrars::{GodaddyAdapter, NamecheapAdapter};
use crate::traits::{DnsProviderAdapter, RegistrarAdapter};
use crate::types::Provider;

/// Create the DNS adapter for a vendor, if it has DNS capability.
#[must_use]
pub fn create_dns_adapter(provider: Provider) -> Option<Arc<dyn DnsProviderAdapter>> {
    match provider {
        Provider::Cloudflare => Some(Arc::new(CloudflareAdapter::new())),
        Provider::Route53 => Some(Arc::new(Route53Adapter::new())),
        Provider::Godaddy | Provider::Namecheap => None,
    }
}

/// Create the registrar adapter for a vendor, if it has registrar capability.
#[must_use]
pub fn create_registrar_adapter(provider: Provider) -> Option<Arc<dyn RegistrarAdapter>> {
    match provider {
        Provider::Godaddy => Some(Arc::new(GodaddyAdapter::new())),
        Provider::Namecheap => Some(Arc::new(NamecheapAdapter::new())),
        Provider::Cloudflare | Provider::Route53 => None,
    }
}
