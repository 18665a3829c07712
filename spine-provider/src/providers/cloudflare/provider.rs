//! Cloudflare CnameProvider trait 实现

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, relative_to_full_name};
use crate::traits::{CnameProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{CnameRecord, owner_comment};

use super::types::{CreateCnameBody, TokenVerifyResult};
use super::{
    CloudflareDnsRecord, CloudflareProvider, CloudflareZone, MAX_PAGE_SIZE_RECORDS,
    MAX_PAGE_SIZE_ZONES,
};

impl CloudflareProvider {
    /// 按根域名查询 zone，必须恰好命中一个
    pub(crate) async fn find_zone(&self, root: &str) -> Result<CloudflareZone> {
        let root = normalize_domain_name(root);
        let path = format!("/zones?name={}", urlencoding::encode(&root));
        let (mut zones, _): (Vec<CloudflareZone>, bool) = self
            .get_page(&path, ErrorContext::for_domain(&root))
            .await?;

        match zones.len() {
            1 => Ok(zones.remove(0)),
            0 => Err(ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: root,
                raw_message: None,
            }),
            n => Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "root".to_string(),
                detail: format!("expected exactly one zone for '{root}', found {n}"),
            }),
        }
    }

    /// 列出账户下全部 zone（自动翻页）
    async fn list_all_zones(&self) -> Result<Vec<CloudflareZone>> {
        let mut zones = Vec::new();
        let mut page = 1;
        loop {
            let path = format!("/zones?page={page}&per_page={MAX_PAGE_SIZE_ZONES}");
            let (batch, has_more): (Vec<CloudflareZone>, bool) =
                self.get_page(&path, ErrorContext::default()).await?;
            zones.extend(batch);
            if !has_more {
                return Ok(zones);
            }
            page += 1;
        }
    }

    /// zone 下是否存在带可用标记的 A 记录
    async fn zone_is_available(&self, zone: &CloudflareZone) -> Result<bool> {
        let path = format!(
            "/zones/{}/dns_records?type=A&comment.exact={}&per_page={MAX_PAGE_SIZE_RECORDS}",
            zone.id,
            urlencoding::encode(&self.availability_tag)
        );
        let (records, _): (Vec<CloudflareDnsRecord>, bool) = self
            .get_page(&path, ErrorContext::for_domain(&zone.name))
            .await?;
        Ok(!records.is_empty())
    }

    pub(crate) fn to_cname_record(record: CloudflareDnsRecord, zone_id: &str) -> CnameRecord {
        CnameRecord {
            id: record.id,
            zone_id: zone_id.to_string(),
            name: normalize_domain_name(&record.name),
            content: normalize_domain_name(&record.content),
            proxied: record.proxied,
            comment: record.comment,
        }
    }
}

#[async_trait]
impl CnameProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self
            .get::<TokenVerifyResult>("/user/tokens/verify", ErrorContext::default())
            .await
        {
            Ok(resp) => Ok(resp.status == "active"),
            Err(ProviderError::InvalidCredentials { .. } | ProviderError::PermissionDenied { .. }) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_cname(&self, owner_tag: &str, sub: &str, root: &str) -> Result<CnameRecord> {
        let root = normalize_domain_name(root);
        let full_name = relative_to_full_name(sub, &root);
        let zone = self.find_zone(&root).await?;

        let body = CreateCnameBody {
            record_type: "CNAME",
            name: &full_name,
            content: &root,
            ttl: 1,
            proxied: self.proxied,
            comment: owner_comment(owner_tag),
        };

        let record: CloudflareDnsRecord = self
            .post(
                &format!("/zones/{}/dns_records", zone.id),
                &body,
                ErrorContext::for_record_name(&full_name, &root),
            )
            .await?;

        log::info!("[cloudflare] Created CNAME {full_name} -> {root} ({})", record.id);
        Ok(Self::to_cname_record(record, &zone.id))
    }

    async fn delete_cname(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.delete(
            &format!("/zones/{zone_id}/dns_records/{record_id}"),
            ErrorContext::for_record_id(record_id),
        )
        .await?;
        log::info!("[cloudflare] Deleted CNAME record {record_id} in zone {zone_id}");
        Ok(())
    }

    async fn find_cname(&self, sub: &str, root: &str) -> Result<Option<CnameRecord>> {
        let root = normalize_domain_name(root);
        let full_name = relative_to_full_name(sub, &root);
        let zone = match self.find_zone(&root).await {
            Ok(zone) => zone,
            Err(ProviderError::DomainNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let path = format!(
            "/zones/{}/dns_records?type=CNAME&name.exact={}",
            zone.id,
            urlencoding::encode(&full_name)
        );
        let (records, _): (Vec<CloudflareDnsRecord>, bool) = self
            .get_page(&path, ErrorContext::for_record_name(&full_name, &root))
            .await?;

        Ok(records
            .into_iter()
            .next()
            .map(|r| Self::to_cname_record(r, &zone.id)))
    }

    async fn list_available_root_domains(&self) -> Result<Vec<String>> {
        let zones = self.list_all_zones().await?;
        let checks = join_all(zones.iter().map(|zone| self.zone_is_available(zone))).await;

        let mut domains: Vec<String> = zones
            .iter()
            .zip(checks)
            .filter_map(|(zone, check)| match check {
                Ok(true) => Some(normalize_domain_name(&zone.name)),
                Ok(false) => None,
                Err(e) => {
                    log::warn!("[cloudflare] Skipping zone {}: {e}", zone.name);
                    None
                }
            })
            .collect();
        domains.sort();
        domains.dedup();

        log::debug!("[cloudflare] {} available root domain(s)", domains.len());
        Ok(domains)
    }
}
