//! Runtime registry of vendor adapters.

use std::collections::HashMap;
use std::sync::Arc;

use orbit_domains_provider::{
    create_dns_adapter, create_registrar_adapter, DnsProviderAdapter, Provider, RegistrarAdapter,
};
use tokio::sync::RwLock;

const ALL_PROVIDERS: [Provider; 4] = [
    Provider::Cloudflare,
    Provider::Route53,
    Provider::Godaddy,
    Provider::Namecheap,
];

/// Registry mapping vendors to their adapter instances.
///
/// Adapters are stateless, so a single instance per vendor is shared by
/// every call. Services resolve adapters here instead of constructing
/// them, which lets tests register mocks under any vendor.
#[derive(Default)]
pub struct AdapterRegistry {
    dns: RwLock<HashMap<Provider, Arc<dyn DnsProviderAdapter>>>,
    registrars: RwLock<HashMap<Provider, Arc<dyn RegistrarAdapter>>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with every built-in vendor adapter.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut dns: HashMap<Provider, Arc<dyn DnsProviderAdapter>> = HashMap::new();
        let mut registrars: HashMap<Provider, Arc<dyn RegistrarAdapter>> = HashMap::new();
        for provider in ALL_PROVIDERS {
            if let Some(adapter) = create_dns_adapter(provider) {
                dns.insert(provider, adapter);
            }
            if let Some(adapter) = create_registrar_adapter(provider) {
                registrars.insert(provider, adapter);
            }
        }
        Self::with_adapters(dns, registrars)
    }

    /// Registry seeded from prebuilt adapter maps.
    #[must_use]
    pub fn with_adapters(
        dns: HashMap<Provider, Arc<dyn DnsProviderAdapter>>,
        registrars: HashMap<Provider, Arc<dyn RegistrarAdapter>>,
    ) -> Self {
        Self {
            dns: RwLock::new(dns),
            registrars: RwLock::new(registrars),
        }
    }

    /// Register (or replace) the DNS adapter for a vendor.
    pub async fn register_dns(&self, provider: Provider, adapter: Arc<dyn DnsProviderAdapter>) {
        self.dns.write().await.insert(provider, adapter);
    }

    /// Register (or replace) the registrar adapter for a vendor.
    pub async fn register_registrar(
        &self,
        provider: Provider,
        adapter: Arc<dyn RegistrarAdapter>,
    ) {
        self.registrars.write().await.insert(provider, adapter);
    }

    /// DNS adapter for a vendor, if one is registered.
    pub async fn dns(&self, provider: Provider) -> Option<Arc<dyn DnsProviderAdapter>> {
        self.dns.read().await.get(&provider).cloned()
    }

    /// Registrar adapter for a vendor, if one is registered.
    pub async fn registrar(&self, provider: Provider) -> Option<Arc<dyn RegistrarAdapter>> {
        self.registrars.read().await.get(&provider).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_cover_every_capability() {
        let registry = AdapterRegistry::with_defaults();
        assert!(registry.dns(Provider::Cloudflare).await.is_some());
        assert!(registry.dns(Provider::Route53).await.is_some());
        assert!(registry.registrar(Provider::Godaddy).await.is_some());
        assert!(registry.registrar(Provider::Namecheap).await.is_some());

        // Registrars carry no DNS capability and vice versa.
        assert!(registry.dns(Provider::Godaddy).await.is_none());
        assert!(registry.registrar(Provider::Cloudflare).await.is_none());
    }

    #[tokio::test]
    async fn empty_registry_resolves_nothing() {
        let registry = AdapterRegistry::new();
        assert!(registry.dns(Provider::Cloudflare).await.is_none());
    }
}
