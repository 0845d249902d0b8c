//! Cloudflare `DnsProviderAdapter` implementation

use async_trait::async_trait;
use reqwest::Method;

use crate::error::Result;
use crate::providers::common::{parse_record_type, record_type_to_string};
use crate::traits::{DnsProviderAdapter, ErrorContext};
use crate::types::{
    DnsRecord, DnsRecordType, ProviderCredentials, RecordSpec, Zone, ZoneStatus,
};

use super::{
    CloudflareAdapter, CloudflareDnsRecord, CloudflareRecordPayload, CloudflareZone,
    MAX_PAGE_SIZE_RECORDS, MAX_PAGE_SIZE_ZONES,
};

impl CloudflareAdapter {
    fn convert_zone(zone: CloudflareZone) -> Zone {
        let status = match zone.status.as_str() {
            "active" => ZoneStatus::Active,
            "paused" => ZoneStatus::Paused,
            "pending" | "initializing" => ZoneStatus::Pending,
            _ => ZoneStatus::Unknown,
        };
        Zone {
            id: zone.id,
            name: zone.name,
            status,
            name_servers: zone.name_servers,
        }
    }

    fn convert_record(&self, record: CloudflareDnsRecord) -> Result<DnsRecord> {
        let record_type = parse_record_type(&record.record_type, "cloudflare")?;
        Ok(DnsRecord {
            id: record.id,
            name: record.name,
            record_type,
            content: record.content,
            ttl: record.ttl,
            priority: record.priority,
            proxied: record.proxied.unwrap_or(false),
        })
    }

    /// Whether `page` is the last page a listing can have.
    ///
    /// Guards the pagination loops against a short page: if the API ever
    /// returns fewer items than `total_count` promises (items deleted
    /// mid-pagination, or a page missing its `result_info`), the count
    /// check alone would never be satisfied.
    fn last_page(total: u32, page: u32, per_page: u32) -> bool {
        total <= page * per_page
    }

    fn payload(spec: &RecordSpec) -> CloudflareRecordPayload {
        // Only proxyable types may carry the flag
        let proxied = matches!(
            spec.record_type,
            DnsRecordType::A | DnsRecordType::Aaaa | DnsRecordType::Cname
        )
        .then_some(spec.proxied);
        CloudflareRecordPayload {
            record_type: record_type_to_string(spec.record_type),
            name: spec.name.clone(),
            content: spec.content.clone(),
            ttl: spec.ttl,
            priority: spec.priority,
            proxied,
        }
    }
}

#[async_trait]
impl DnsProviderAdapter for CloudflareAdapter {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn get_zones(&self, credentials: &ProviderCredentials) -> Result<Vec<Zone>> {
        let token = self.token(credentials)?;
        let mut zones = Vec::new();
        let mut page = 1_u32;

        loop {
            let path = format!("/zones?page={page}&per_page={MAX_PAGE_SIZE_ZONES}");
            let response = self
                .request::<Vec<CloudflareZone>, ()>(
                    token,
                    Method::GET,
                    &path,
                    None,
                    ErrorContext::default(),
                )
                .await?;

            let total = response.result_info.as_ref().map_or(0, |i| i.total_count);
            zones.extend(response.result.unwrap_or_default().into_iter().map(Self::convert_zone));

            if zones.len() as u32 >= total || Self::last_page(total, page, MAX_PAGE_SIZE_ZONES) {
                break;
            }
            page += 1;
        }

        Ok(zones)
    }

    async fn get_zone(&self, credentials: &ProviderCredentials, zone_id: &str) -> Result<Zone> {
        let token = self.token(credentials)?;
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            ..ErrorContext::default()
        };
        let zone = self
            .request_result::<CloudflareZone, ()>(
                token,
                Method::GET,
                &format!("/zones/{zone_id}"),
                None,
                context,
            )
            .await?;
        Ok(Self::convert_zone(zone))
    }

    async fn get_records(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        type_filter: Option<DnsRecordType>,
    ) -> Result<Vec<DnsRecord>> {
        let token = self.token(credentials)?;
        let type_param = type_filter
            .map(|t| format!("&type={}", record_type_to_string(t)))
            .unwrap_or_default();

        let mut records = Vec::new();
        let mut page = 1_u32;

        loop {
            let path = format!(
                "/zones/{zone_id}/dns_records?page={page}&per_page={MAX_PAGE_SIZE_RECORDS}{type_param}"
            );
            let context = ErrorContext {
                zone_id: Some(zone_id.to_string()),
                ..ErrorContext::default()
            };
            let response = self
                .request::<Vec<CloudflareDnsRecord>, ()>(
                    token,
                    Method::GET,
                    &path,
                    None,
                    context,
                )
                .await?;

            let total = response.result_info.as_ref().map_or(0, |i| i.total_count);
            for raw in response.result.unwrap_or_default() {
                // Unsupported record types (e.g. LOC) are skipped, not fatal
                match self.convert_record(raw) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("[cloudflare] skipping record: {e}"),
                }
            }

            if records.len() as u32 >= total || Self::last_page(total, page, MAX_PAGE_SIZE_RECORDS)
            {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    async fn get_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<DnsRecord> {
        let token = self.token(credentials)?;
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            record_id: Some(record_id.to_string()),
            ..ErrorContext::default()
        };
        let record = self
            .request_result::<CloudflareDnsRecord, ()>(
                token,
                Method::GET,
                &format!("/zones/{zone_id}/dns_records/{record_id}"),
                None,
                context,
            )
            .await?;
        self.convert_record(record)
    }

    async fn create_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord> {
        let token = self.token(credentials)?;
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            record_name: Some(record.name.clone()),
            ..ErrorContext::default()
        };
        let created = self
            .request_result::<CloudflareDnsRecord, CloudflareRecordPayload>(
                token,
                Method::POST,
                &format!("/zones/{zone_id}/dns_records"),
                Some(&Self::payload(record)),
                context,
            )
            .await?;
        self.convert_record(created)
    }

    async fn update_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord> {
        let token = self.token(credentials)?;
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            record_id: Some(record_id.to_string()),
            record_name: Some(record.name.clone()),
            ..ErrorContext::default()
        };
        let updated = self
            .request_result::<CloudflareDnsRecord, CloudflareRecordPayload>(
                token,
                Method::PATCH,
                &format!("/zones/{zone_id}/dns_records/{record_id}"),
                Some(&Self::payload(record)),
                context,
            )
            .await?;
        self.convert_record(updated)
    }

    async fn delete_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<bool> {
        let token = self.token(credentials)?;
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            record_id: Some(record_id.to_string()),
            ..ErrorContext::default()
        };
        self.request::<serde_json::Value, ()>(
            token,
            Method::DELETE,
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            None,
            context,
        )
        .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn convert_zone_statuses() {
        let zone = CloudflareZone {
            id: "z1".to_string(),
            name: "example.com".to_string(),
            status: "active".to_string(),
            name_servers: vec!["ada.ns.cloudflare.com".to_string()],
        };
        let converted = CloudflareAdapter::convert_zone(zone);
        assert_eq!(converted.status, ZoneStatus::Active);
        assert_eq!(converted.name_servers.len(), 1);

        let unknown = CloudflareZone {
            id: "z2".to_string(),
            name: "example.org".to_string(),
            status: "moved".to_string(),
            name_servers: vec![],
        };
        assert_eq!(
            CloudflareAdapter::convert_zone(unknown).status,
            ZoneStatus::Unknown
        );
    }

    #[test]
    fn convert_record_mx() {
        let adapter = CloudflareAdapter::new();
        let raw = CloudflareDnsRecord {
            id: "r1".to_string(),
            record_type: "MX".to_string(),
            name: "example.com".to_string(),
            content: "mail.example.com".to_string(),
            ttl: 3600,
            priority: Some(10),
            proxied: None,
        };
        let record = adapter.convert_record(raw).unwrap();
        assert_eq!(record.record_type, DnsRecordType::Mx);
        assert_eq!(record.priority, Some(10));
        assert!(!record.proxied);
    }

    #[test]
    fn payload_proxied_only_for_proxyable_types() {
        let a_spec = RecordSpec {
            name: "www.example.com".to_string(),
            record_type: DnsRecordType::A,
            content: "1.2.3.4".to_string(),
            ttl: 300,
            priority: None,
            proxied: true,
        };
        assert_eq!(CloudflareAdapter::payload(&a_spec).proxied, Some(true));

        let txt_spec = RecordSpec {
            name: "example.com".to_string(),
            record_type: DnsRecordType::Txt,
            content: "v=spf1 -all".to_string(),
            ttl: 300,
            priority: None,
            proxied: false,
        };
        assert_eq!(CloudflareAdapter::payload(&txt_spec).proxied, None);
    }

    #[test]
    fn pagination_terminates_on_short_pages() {
        // 120 zones at 50 per page: pages 1 and 2 are not final, page 3 is,
        // even if the accumulated count never reaches the promised total.
        assert!(!CloudflareAdapter::last_page(120, 1, MAX_PAGE_SIZE_ZONES));
        assert!(!CloudflareAdapter::last_page(120, 2, MAX_PAGE_SIZE_ZONES));
        assert!(CloudflareAdapter::last_page(120, 3, MAX_PAGE_SIZE_ZONES));

        // A page with no result_info reports total 0 and stops immediately.
        assert!(CloudflareAdapter::last_page(0, 1, MAX_PAGE_SIZE_ZONES));
    }

    #[test]
    fn token_rejects_foreign_credentials() {
        let adapter = CloudflareAdapter::new();
        let creds = ProviderCredentials::Godaddy {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
        };
        let result = adapter.token(&creds);
        assert!(matches!(
            result,
            Err(ProviderError::InvalidCredentials { .. })
        ));
    }
}
