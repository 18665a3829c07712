//! Cloudflare DNS Provider

mod error;
mod http;
mod provider;
mod types;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{DEFAULT_REQUEST_TIMEOUT_SECS, create_http_client};
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub(crate) const PROVIDER_NAME: &str = "cloudflare";
/// Cloudflare Zones API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 100;
/// 只读请求的最大重试次数
pub(crate) const READ_RETRIES: u32 = 3;
/// 根域名 A 记录上的默认可用标记（comment）
pub const DEFAULT_AVAILABILITY_TAG: &str = "spine";

/// Cloudflare CNAME Provider
///
/// Creates proxied CNAMEs pointing a user subdomain at its root domain, and
/// discovers which root domains are open for registration by looking for A
/// records whose comment equals the availability tag.
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) availability_tag: String,
    pub(crate) proxied: bool,
}

impl CloudflareProvider {
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(
            api_token,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// 自定义单次 HTTP 请求超时
    pub fn with_timeout(api_token: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(PROVIDER_NAME, request_timeout)?,
            api_token: api_token.into(),
            availability_tag: DEFAULT_AVAILABILITY_TAG.to_string(),
            proxied: true,
        })
    }

    /// 设置根域名可用标记
    #[must_use]
    pub fn with_availability_tag(mut self, tag: impl Into<String>) -> Self {
        self.availability_tag = tag.into();
        self
    }

    /// 新建 CNAME 是否经由 Cloudflare 代理
    #[must_use]
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &mask_secret(&self.api_token))
            .field("availability_tag", &self.availability_tag)
            .field("proxied", &self.proxied)
            .finish_non_exhaustive()
    }
}
