//! 根域名可用性服务

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::CoreResult;
use crate::services::ServiceContext;

/// 默认缓存有效期
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CachedDomains {
    domains: Vec<String>,
    fetched_at: Instant,
}

/// Root domains open for registration, cached for `ttl`.
///
/// A failed refresh falls back to the stale list when one exists, so a
/// provider hiccup does not block registrations on known roots.
pub struct DomainService {
    ctx: Arc<ServiceContext>,
    ttl: Duration,
    cache: RwLock<Option<CachedDomains>>,
}

impl DomainService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, ttl: Duration) -> Self {
        Self {
            ctx,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// 列出可用根域名（已排序）
    pub async fn list_available(&self) -> CoreResult<Vec<String>> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < self.ttl
            {
                return Ok(cached.domains.clone());
            }
        }

        let mut cache = self.cache.write().await;
        // 等锁期间可能已被其它任务刷新
        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return Ok(cached.domains.clone());
        }

        match self.ctx.provider().list_available_root_domains().await {
            Ok(domains) => {
                log::debug!("Refreshed available root domains: {domains:?}");
                *cache = Some(CachedDomains {
                    domains: domains.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(domains)
            }
            Err(e) => match cache.as_ref() {
                Some(stale) => {
                    log::warn!("Failed to refresh root domains, serving stale list: {e}");
                    Ok(stale.domains.clone())
                }
                None => Err(e.into()),
            },
        }
    }

    /// 根域名是否可用
    pub async fn is_available(&self, root: &str) -> CoreResult<bool> {
        let domains = self.list_available().await?;
        Ok(domains.iter().any(|d| d.eq_ignore_ascii_case(root)))
    }

    /// 清空缓存，下次查询强制刷新
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
