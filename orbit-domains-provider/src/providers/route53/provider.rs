//! Route 53 `DnsProviderAdapter` implementation.
//!
//! Route 53 has no per-record identifiers: records live in multi-valued
//! resource record sets keyed by `(name, type)`. The adapter flattens each
//! value into one [`DnsRecord`] with a synthetic id of the form
//! `name|TYPE|value-hash`, and implements mutations as read-merge
//! `ChangeResourceRecordSets` batches against the owning set.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use sha2::{Digest, Sha256};

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::providers::common::{parse_record_type, record_type_to_string};
use crate::providers::xml::{escape, extract_tag, tag_blocks};
use crate::traits::{DnsProviderAdapter, ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::{
    DnsRecord, DnsRecordType, ProviderCredentials, RecordSpec, Zone, ZoneStatus,
};

use super::sign::sign_v4;
use super::{MAX_ITEMS, R53_API_BASE, R53_API_VERSION, Route53Adapter};

const R53_HOST: &str = "route53.amazonaws.com";

/// One resource record set as returned by `ListResourceRecordSets`.
#[derive(Debug)]
struct RecordSet {
    name: String,
    type_str: String,
    ttl: u32,
    values: Vec<String>,
}

impl Route53Adapter {
    async fn request(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
        method: Method,
        path: &str,
        query: &str,
        payload: &str,
        context: ErrorContext,
    ) -> Result<String> {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("Host".to_string(), R53_HOST.to_string()),
            ("X-Amz-Date".to_string(), timestamp.clone()),
        ];
        if !payload.is_empty() {
            headers.push(("Content-Type".to_string(), "text/xml".to_string()));
        }

        let authorization = sign_v4(
            access_key_id,
            secret_access_key,
            method.as_str(),
            path,
            query,
            &headers,
            payload,
            &timestamp,
        );

        let url = if query.is_empty() {
            format!("{R53_API_BASE}{path}")
        } else {
            format!("{R53_API_BASE}{path}?{query}")
        };
        let method_name = method.as_str().to_string();

        let mut builder = self
            .client
            .request(method, &url)
            .header("X-Amz-Date", &timestamp)
            .header("Authorization", authorization);
        if !payload.is_empty() {
            builder = builder
                .header("Content-Type", "text/xml")
                .body(payload.to_string());
        }

        let (status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), &method_name, &url).await?;

        if !(200..300).contains(&status) {
            let raw = match extract_tag(&text, "Code") {
                Some(code) => RawApiError::with_code(
                    code,
                    extract_tag(&text, "Message").unwrap_or_else(|| format!("HTTP {status}")),
                ),
                None => RawApiError::new(format!("HTTP {status}: {text}")),
            };
            let err = self.map_error(raw, context);
            if err.is_expected() {
                log::warn!("[route53] API error: {err}");
            } else {
                log::error!("[route53] API error: {err}");
            }
            return Err(err);
        }

        Ok(text)
    }

    /// Fetch the record set owning `(name, type)`, if any.
    async fn get_record_set(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
        zone_id: &str,
        name_fqdn: &str,
        type_str: &str,
    ) -> Result<Option<RecordSet>> {
        let path = format!("/{R53_API_VERSION}/hostedzone/{zone_id}/rrset");
        let query = format!(
            "maxitems=1&name={}&type={type_str}",
            urlencoding::encode(name_fqdn)
        );
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            ..ErrorContext::default()
        };
        let xml = self
            .request(
                access_key_id,
                secret_access_key,
                Method::GET,
                &path,
                &query,
                "",
                context,
            )
            .await?;

        // The list starts at the requested position; the first set may belong
        // to a different name when the requested one does not exist.
        let Some(block) = tag_blocks(&xml, "ResourceRecordSet").into_iter().next() else {
            return Ok(None);
        };
        let set = Self::parse_record_set(block)
            .ok_or_else(|| self.parse_error("malformed ResourceRecordSet element"))?;
        if set.name.eq_ignore_ascii_case(name_fqdn.trim_end_matches('.')) && set.type_str == type_str
        {
            Ok(Some(set))
        } else {
            Ok(None)
        }
    }

    /// Submit a single-change `ChangeResourceRecordSets` batch.
    async fn submit_change(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
        zone_id: &str,
        action: &str,
        name_fqdn: &str,
        type_str: &str,
        ttl: u32,
        values: &[String],
        context: ErrorContext,
    ) -> Result<()> {
        let path = format!("/{R53_API_VERSION}/hostedzone/{zone_id}/rrset");
        let payload = Self::change_batch_xml(action, name_fqdn, type_str, ttl, values);
        self.request(
            access_key_id,
            secret_access_key,
            Method::POST,
            &path,
            "",
            &payload,
            context,
        )
        .await?;
        Ok(())
    }

    fn parse_record_set(block: &str) -> Option<RecordSet> {
        let name = Self::normalize_record_name(&extract_tag(block, "Name")?);
        let type_str = extract_tag(block, "Type")?;
        let ttl = extract_tag(block, "TTL")
            .and_then(|t| t.parse().ok())
            .unwrap_or(300);
        let values = tag_blocks(block, "ResourceRecord")
            .into_iter()
            .filter_map(|rr| extract_tag(rr, "Value"))
            .collect();
        Some(RecordSet {
            name,
            type_str,
            ttl,
            values,
        })
    }

    fn change_batch_xml(
        action: &str,
        name_fqdn: &str,
        type_str: &str,
        ttl: u32,
        values: &[String],
    ) -> String {
        let records: String = values
            .iter()
            .map(|v| format!("<ResourceRecord><Value>{}</Value></ResourceRecord>", escape(v)))
            .collect();
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<ChangeResourceRecordSetsRequest xmlns="https://route53.amazonaws.com/doc/2013-04-01/">"#,
                "<ChangeBatch><Changes><Change>",
                "<Action>{action}</Action>",
                "<ResourceRecordSet>",
                "<Name>{name}</Name>",
                "<Type>{rtype}</Type>",
                "<TTL>{ttl}</TTL>",
                "<ResourceRecords>{records}</ResourceRecords>",
                "</ResourceRecordSet>",
                "</Change></Changes></ChangeBatch>",
                "</ChangeResourceRecordSetsRequest>",
            ),
            action = action,
            name = escape(name_fqdn),
            rtype = type_str,
            ttl = ttl,
            records = records,
        )
    }

    /// Strip the `/hostedzone/` prefix AWS puts in `Id` elements.
    fn normalize_zone_id(raw: &str) -> String {
        raw.trim_start_matches("/hostedzone/").to_string()
    }

    /// Trailing-dot and wildcard-escape normalization for record names.
    fn normalize_record_name(raw: &str) -> String {
        raw.trim_end_matches('.').replace("\\052", "*")
    }

    fn to_fqdn(name: &str) -> String {
        let trimmed = name.trim_end_matches('.');
        format!("{trimmed}.")
    }

    fn value_hash(value: &str) -> String {
        let digest = hex::encode(Sha256::digest(value.as_bytes()));
        digest[..12].to_string()
    }

    /// Synthetic record id: `name|TYPE|value-hash`.
    fn record_id(name: &str, record_type: DnsRecordType, raw_value: &str) -> String {
        format!(
            "{name}|{}|{}",
            record_type_to_string(record_type),
            Self::value_hash(raw_value)
        )
    }

    fn parse_record_id(&self, record_id: &str) -> Result<(String, DnsRecordType, String)> {
        let mut parts = record_id.splitn(3, '|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(type_str), Some(hash)) if !name.is_empty() && !hash.is_empty() => {
                let record_type = parse_record_type(type_str, "route53")?;
                Ok((name.to_string(), record_type, hash.to_string()))
            }
            _ => Err(ProviderError::InvalidParameter {
                provider: "route53".to_string(),
                param: "record_id".to_string(),
                detail: format!("expected 'name|TYPE|hash', got '{record_id}'"),
            }),
        }
    }

    /// Encode a record's content into the Route 53 value form.
    ///
    /// TXT values are wrapped in quotes, MX and SRV carry the priority as a
    /// leading integer inside the value.
    fn encode_value(record_type: DnsRecordType, content: &str, priority: Option<u16>) -> String {
        match record_type {
            DnsRecordType::Txt => {
                if content.starts_with('"') && content.ends_with('"') {
                    content.to_string()
                } else {
                    format!("\"{content}\"")
                }
            }
            DnsRecordType::Mx | DnsRecordType::Srv => match priority {
                Some(p) => format!("{p} {content}"),
                None => content.to_string(),
            },
            _ => content.to_string(),
        }
    }

    /// Inverse of [`encode_value`](Self::encode_value).
    fn decode_value(record_type: DnsRecordType, raw: &str) -> (String, Option<u16>) {
        match record_type {
            DnsRecordType::Txt => {
                let trimmed = raw
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(raw);
                (trimmed.to_string(), None)
            }
            DnsRecordType::Mx | DnsRecordType::Srv => match raw.split_once(' ') {
                Some((prio, rest)) => match prio.parse::<u16>() {
                    Ok(p) => (rest.to_string(), Some(p)),
                    Err(_) => (raw.to_string(), None),
                },
                None => (raw.to_string(), None),
            },
            _ => (raw.to_string(), None),
        }
    }

    fn build_record(name: &str, record_type: DnsRecordType, ttl: u32, raw_value: &str) -> DnsRecord {
        let (content, priority) = Self::decode_value(record_type, raw_value);
        DnsRecord {
            id: Self::record_id(name, record_type, raw_value),
            name: name.to_string(),
            record_type,
            content,
            ttl,
            priority,
            proxied: false,
        }
    }

    /// Remove one value from its owning set: UPSERT the remainder, or DELETE
    /// the whole set when the value was the last one.
    async fn remove_value(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
        zone_id: &str,
        set: &RecordSet,
        raw_value: &str,
        context: ErrorContext,
    ) -> Result<()> {
        let remaining: Vec<String> = set
            .values
            .iter()
            .filter(|v| v.as_str() != raw_value)
            .cloned()
            .collect();
        let name_fqdn = Self::to_fqdn(&set.name);
        if remaining.is_empty() {
            self.submit_change(
                access_key_id,
                secret_access_key,
                zone_id,
                "DELETE",
                &name_fqdn,
                &set.type_str,
                set.ttl,
                &set.values,
                context,
            )
            .await
        } else {
            self.submit_change(
                access_key_id,
                secret_access_key,
                zone_id,
                "UPSERT",
                &name_fqdn,
                &set.type_str,
                set.ttl,
                &remaining,
                context,
            )
            .await
        }
    }
}

#[async_trait]
impl DnsProviderAdapter for Route53Adapter {
    fn id(&self) -> &'static str {
        "route53"
    }

    async fn get_zones(&self, credentials: &ProviderCredentials) -> Result<Vec<Zone>> {
        let (ak, sk) = self.keys(credentials)?;
        let path = format!("/{R53_API_VERSION}/hostedzone");
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let query = match &marker {
                Some(m) => format!("marker={}&maxitems={MAX_ITEMS}", urlencoding::encode(m)),
                None => format!("maxitems={MAX_ITEMS}"),
            };
            let xml = self
                .request(
                    ak,
                    sk,
                    Method::GET,
                    &path,
                    &query,
                    "",
                    ErrorContext::default(),
                )
                .await?;

            for block in tag_blocks(&xml, "HostedZone") {
                let (Some(id), Some(name)) =
                    (extract_tag(block, "Id"), extract_tag(block, "Name"))
                else {
                    return Err(self.parse_error("malformed HostedZone element"));
                };
                zones.push(Zone {
                    id: Self::normalize_zone_id(&id),
                    name: Self::normalize_record_name(&name),
                    // Hosted zones answer queries as soon as they exist
                    status: ZoneStatus::Active,
                    name_servers: Vec::new(),
                });
            }

            let truncated = extract_tag(&xml, "IsTruncated").is_some_and(|t| t == "true");
            if !truncated {
                break;
            }
            marker = extract_tag(&xml, "NextMarker");
            if marker.is_none() {
                break;
            }
        }

        Ok(zones)
    }

    async fn get_zone(&self, credentials: &ProviderCredentials, zone_id: &str) -> Result<Zone> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let path = format!("/{R53_API_VERSION}/hostedzone/{zone_id}");
        let context = ErrorContext {
            zone_id: Some(zone_id.clone()),
            ..ErrorContext::default()
        };
        let xml = self
            .request(ak, sk, Method::GET, &path, "", "", context)
            .await?;

        let zone_block = tag_blocks(&xml, "HostedZone")
            .into_iter()
            .next()
            .ok_or_else(|| self.parse_error("missing HostedZone element"))?;
        let (Some(id), Some(name)) = (
            extract_tag(zone_block, "Id"),
            extract_tag(zone_block, "Name"),
        ) else {
            return Err(self.parse_error("malformed HostedZone element"));
        };

        let name_servers = tag_blocks(&xml, "NameServer")
            .into_iter()
            .filter_map(|b| extract_tag(b, "NameServer"))
            .collect();

        Ok(Zone {
            id: Self::normalize_zone_id(&id),
            name: Self::normalize_record_name(&name),
            status: ZoneStatus::Active,
            name_servers,
        })
    }

    async fn get_records(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        type_filter: Option<DnsRecordType>,
    ) -> Result<Vec<DnsRecord>> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let path = format!("/{R53_API_VERSION}/hostedzone/{zone_id}/rrset");

        let mut records = Vec::new();
        let mut start: Option<(String, String)> = None;

        loop {
            let query = match &start {
                Some((name, type_str)) => format!(
                    "maxitems={MAX_ITEMS}&name={}&type={type_str}",
                    urlencoding::encode(name)
                ),
                None => format!("maxitems={MAX_ITEMS}"),
            };
            let context = ErrorContext {
                zone_id: Some(zone_id.clone()),
                ..ErrorContext::default()
            };
            let xml = self
                .request(ak, sk, Method::GET, &path, &query, "", context)
                .await?;

            for block in tag_blocks(&xml, "ResourceRecordSet") {
                let Some(set) = Self::parse_record_set(block) else {
                    return Err(self.parse_error("malformed ResourceRecordSet element"));
                };
                // SOA and alias sets fall out here: SOA is not a supported
                // record type and alias sets carry no values.
                let Ok(record_type) = parse_record_type(&set.type_str, "route53") else {
                    log::debug!("[route53] skipping {} set '{}'", set.type_str, set.name);
                    continue;
                };
                if type_filter.is_some_and(|f| f != record_type) {
                    continue;
                }
                for value in &set.values {
                    records.push(Self::build_record(&set.name, record_type, set.ttl, value));
                }
            }

            let truncated = extract_tag(&xml, "IsTruncated").is_some_and(|t| t == "true");
            if !truncated {
                break;
            }
            match (
                extract_tag(&xml, "NextRecordName"),
                extract_tag(&xml, "NextRecordType"),
            ) {
                (Some(name), Some(type_str)) => start = Some((name, type_str)),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn get_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<DnsRecord> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let (name, record_type, hash) = self.parse_record_id(record_id)?;
        let type_str = record_type_to_string(record_type);

        let set = self
            .get_record_set(ak, sk, &zone_id, &Self::to_fqdn(&name), type_str)
            .await?;
        set.and_then(|set| {
            set.values
                .iter()
                .find(|v| Self::value_hash(v) == hash)
                .map(|v| Self::build_record(&set.name, record_type, set.ttl, v))
        })
        .ok_or_else(|| ProviderError::RecordNotFound {
            provider: "route53".to_string(),
            record_id: record_id.to_string(),
            raw_message: None,
        })
    }

    async fn create_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let name_fqdn = Self::to_fqdn(&record.name);
        let type_str = record_type_to_string(record.record_type);
        let value = Self::encode_value(record.record_type, &record.content, record.priority);

        let existing = self
            .get_record_set(ak, sk, &zone_id, &name_fqdn, type_str)
            .await?;

        let mut values = existing.map(|set| set.values).unwrap_or_default();
        if values.iter().any(|v| v == &value) {
            return Err(ProviderError::RecordExists {
                provider: "route53".to_string(),
                record_name: record.name.clone(),
                raw_message: None,
            });
        }
        values.push(value.clone());

        let context = ErrorContext {
            zone_id: Some(zone_id.clone()),
            record_name: Some(record.name.clone()),
            ..ErrorContext::default()
        };
        self.submit_change(
            ak, sk, &zone_id, "UPSERT", &name_fqdn, type_str, record.ttl, &values, context,
        )
        .await?;

        Ok(Self::build_record(
            record.name.trim_end_matches('.'),
            record.record_type,
            record.ttl,
            &value,
        ))
    }

    async fn update_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
        record: &RecordSpec,
    ) -> Result<DnsRecord> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let (old_name, old_type, old_hash) = self.parse_record_id(record_id)?;
        let old_type_str = record_type_to_string(old_type);

        let old_set = self
            .get_record_set(ak, sk, &zone_id, &Self::to_fqdn(&old_name), old_type_str)
            .await?
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "route53".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        let old_value = old_set
            .values
            .iter()
            .find(|v| Self::value_hash(v) == old_hash)
            .cloned()
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "route53".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;

        let new_name = record.name.trim_end_matches('.').to_string();
        let new_value = Self::encode_value(record.record_type, &record.content, record.priority);
        let same_set = new_name.eq_ignore_ascii_case(&old_set.name)
            && record.record_type == old_type;

        let context = ErrorContext {
            zone_id: Some(zone_id.clone()),
            record_id: Some(record_id.to_string()),
            record_name: Some(record.name.clone()),
            ..ErrorContext::default()
        };

        if same_set {
            // Replace the value in place, keeping any siblings
            let values: Vec<String> = old_set
                .values
                .iter()
                .map(|v| {
                    if v == &old_value {
                        new_value.clone()
                    } else {
                        v.clone()
                    }
                })
                .collect();
            self.submit_change(
                ak,
                sk,
                &zone_id,
                "UPSERT",
                &Self::to_fqdn(&new_name),
                old_type_str,
                record.ttl,
                &values,
                context,
            )
            .await?;
        } else {
            // Identity changed: pull the value out of the old set, then merge
            // it into the target set
            self.remove_value(ak, sk, &zone_id, &old_set, &old_value, context.clone())
                .await?;

            let name_fqdn = Self::to_fqdn(&new_name);
            let type_str = record_type_to_string(record.record_type);
            let mut values = self
                .get_record_set(ak, sk, &zone_id, &name_fqdn, type_str)
                .await?
                .map(|set| set.values)
                .unwrap_or_default();
            if !values.contains(&new_value) {
                values.push(new_value.clone());
            }
            self.submit_change(
                ak, sk, &zone_id, "UPSERT", &name_fqdn, type_str, record.ttl, &values, context,
            )
            .await?;
        }

        Ok(Self::build_record(
            &new_name,
            record.record_type,
            record.ttl,
            &new_value,
        ))
    }

    async fn delete_record(
        &self,
        credentials: &ProviderCredentials,
        zone_id: &str,
        record_id: &str,
    ) -> Result<bool> {
        let (ak, sk) = self.keys(credentials)?;
        let zone_id = Self::normalize_zone_id(zone_id);
        let (name, record_type, hash) = self.parse_record_id(record_id)?;
        let type_str = record_type_to_string(record_type);

        let set = self
            .get_record_set(ak, sk, &zone_id, &Self::to_fqdn(&name), type_str)
            .await?
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "route53".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;
        let value = set
            .values
            .iter()
            .find(|v| Self::value_hash(v) == hash)
            .cloned()
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "route53".to_string(),
                record_id: record_id.to_string(),
                raw_message: None,
            })?;

        let context = ErrorContext {
            zone_id: Some(zone_id.clone()),
            record_id: Some(record_id.to_string()),
            ..ErrorContext::default()
        };
        self.remove_value(ak, sk, &zone_id, &set, &value, context)
            .await?;
        Ok(true)
    }
}
