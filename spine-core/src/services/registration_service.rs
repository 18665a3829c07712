//! Host registration / deletion coordinator
//!
//! Keeps provider CNAMEs and the `dns_records` / `hosts` tables in step:
//! a CNAME exists iff at least one subdomain host references its record.
//! The provider is not transactional, so every step that can leave the two
//! sides apart either compensates or surfaces `ReconciliationRequired`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use spine_provider::{CnameRecord, ProviderError};

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainService, ServiceContext};
use crate::types::{
    DnsRecord, Host, Hostname, LockResource, LockScope, NewHost, ReconciliationEvent,
};

/// Placeholder for provider ids we never learned.
const UNKNOWN_ID: &str = "<unknown>";

/// Registration tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Deadline for each provider call
    pub provider_timeout: Duration,
    /// How many times a lost `dns_records` insert race is retried
    pub unique_violation_retries: u32,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            unique_violation_retries: 3,
        }
    }
}

/// A CNAME we hold at the provider but have not stored yet.
struct Provisioned {
    record: CnameRecord,
    /// Created by this user (by us, or tagged with this user's id), so ours to roll back
    owned: bool,
}

/// 主机名注册服务
pub struct RegistrationService {
    ctx: Arc<ServiceContext>,
    domains: Arc<DomainService>,
    options: RegistrationOptions,
}

impl RegistrationService {
    #[must_use]
    pub fn new(
        ctx: Arc<ServiceContext>,
        domains: Arc<DomainService>,
        options: RegistrationOptions,
    ) -> Self {
        Self {
            ctx,
            domains,
            options,
        }
    }

    /// Claim a full hostname (`i.sharify.me` or `sharify.me`) for a user.
    pub async fn register(&self, raw: &str, user_id: &str) -> CoreResult<Host> {
        let hostname = Hostname::parse(raw)?;
        self.register_hostname(&hostname, user_id).await
    }

    /// Claim `sub.root` from separately supplied parts; `sub` is sanitised first.
    pub async fn register_parts(&self, sub: &str, root: &str, user_id: &str) -> CoreResult<Host> {
        let hostname = Hostname::from_parts(sub, root)?;
        self.register_hostname(&hostname, user_id).await
    }

    /// Release a user's claim on a hostname.
    ///
    /// Returns `false` when the user held no such claim (nothing is touched).
    /// The provider CNAME and its `dns_records` row go away with the last claim.
    pub async fn delete(&self, raw: &str, user_id: &str) -> CoreResult<bool> {
        let hostname = Hostname::parse(raw)?;
        let store = self.ctx.record_store();

        if store
            .find_host(hostname.sub(), hostname.root(), user_id)
            .await?
            .is_none()
        {
            log::debug!("Delete {hostname} by {user_id}: no such host");
            return Ok(false);
        }

        let count = store
            .count_hosts(
                hostname.sub(),
                hostname.root(),
                LockScope::shared(LockResource::Hosts),
            )
            .await?;
        if count == 0 {
            return Ok(false);
        }

        if !hostname.is_root_only() && count == 1 {
            self.release_dns_record(&hostname).await?;
        }

        let removed = store
            .delete_host(
                hostname.sub(),
                hostname.root(),
                user_id,
                LockScope::exclusive(LockResource::Hosts),
            )
            .await?;

        log::info!("Deleted host {hostname} for {user_id}");
        Ok(removed > 0)
    }

    /// 列出用户的全部主机名
    pub async fn list_hosts(&self, user_id: &str) -> CoreResult<Vec<Host>> {
        self.ctx.record_store().list_hosts(user_id).await
    }

    async fn register_hostname(&self, hostname: &Hostname, user_id: &str) -> CoreResult<Host> {
        if user_id.trim().is_empty() {
            return Err(CoreError::ValidationError("user id is required".to_string()));
        }
        if !self.root_is_available(hostname.root()).await? {
            return Err(CoreError::RootDomainUnavailable(hostname.root().to_string()));
        }
        self.ensure_unclaimed(hostname, user_id).await?;

        let dns_record_id = if hostname.is_root_only() {
            None
        } else {
            Some(self.ensure_dns_record(hostname, user_id).await?.id)
        };

        let new_host = NewHost::new(hostname, user_id, dns_record_id);
        match self
            .ctx
            .record_store()
            .insert_host(&new_host, LockScope::shared(LockResource::DnsRecords))
            .await
        {
            Ok(host) => {
                log::info!("Registered host {hostname} for {user_id}");
                Ok(host)
            }
            Err(CoreError::UniqueViolation(detail)) => {
                log::warn!("Host {hostname} claimed concurrently: {detail}");
                Err(CoreError::AlreadyClaimed(hostname.full().to_string()))
            }
            Err(e) => {
                if let Some(record_id) = &new_host.dns_record_id {
                    log::warn!(
                        "Host insert for {hostname} failed, keeping dns record {record_id}: {e}"
                    );
                }
                Err(e)
            }
        }
    }

    /// A user may hold a hostname once; a subdomain hostname belongs to one user.
    async fn ensure_unclaimed(&self, hostname: &Hostname, user_id: &str) -> CoreResult<()> {
        let store = self.ctx.record_store();
        if store
            .find_host(hostname.sub(), hostname.root(), user_id)
            .await?
            .is_some()
        {
            return Err(CoreError::AlreadyClaimed(hostname.full().to_string()));
        }
        if !hostname.is_root_only()
            && store
                .count_hosts(
                    hostname.sub(),
                    hostname.root(),
                    LockScope::shared(LockResource::Hosts),
                )
                .await?
                > 0
        {
            return Err(CoreError::AlreadyClaimed(hostname.full().to_string()));
        }
        Ok(())
    }

    /// Return the stored DNS record for `hostname`, creating the CNAME and the row if needed.
    async fn ensure_dns_record(&self, hostname: &Hostname, user_id: &str) -> CoreResult<DnsRecord> {
        let store = self.ctx.record_store();
        let full = hostname.full();
        let mut pending: Option<Provisioned> = None;

        for attempt in 0..=self.options.unique_violation_retries {
            if let Some(existing) = store
                .find_dns_record(full, LockScope::shared(LockResource::DnsRecords))
                .await?
            {
                if let Some(ours) = pending.take() {
                    self.discard_redundant(full, &ours, &existing).await;
                }
                log::debug!("Reusing dns record {} for {full}", existing.id);
                return Ok(existing);
            }

            let provisioned = match pending.take() {
                Some(p) => p,
                None => match self.provision(hostname, user_id).await? {
                    Some(p) => p,
                    None => continue,
                },
            };

            let record = DnsRecord {
                id: provisioned.record.id.clone(),
                zone_id: provisioned.record.zone_id.clone(),
                hostname: full.to_string(),
            };

            match store.insert_dns_record(&record).await {
                Ok(()) => return Ok(record),
                Err(CoreError::UniqueViolation(detail)) => {
                    log::warn!(
                        "Lost dns record insert race for {full} (attempt {}): {detail}",
                        attempt + 1
                    );
                    pending = Some(provisioned);
                }
                Err(e) => return Err(self.roll_back(full, &provisioned, e).await),
            }
        }

        let cause = CoreError::StorageError(format!(
            "could not settle dns record for {full} after {} attempts",
            self.options.unique_violation_retries + 1
        ));
        match pending {
            Some(ours) => Err(self.roll_back(full, &ours, cause).await),
            None => Err(cause),
        }
    }

    /// Create the CNAME, settling ambiguous outcomes by looking the record up.
    ///
    /// `Ok(None)` means the provider reported the record as existing but it
    /// was gone by the time we looked; the caller retries.
    async fn provision(&self, hostname: &Hostname, user_id: &str) -> CoreResult<Option<Provisioned>> {
        let provider = self.ctx.provider();
        let (sub, root) = (hostname.sub(), hostname.root());

        let err = match self
            .with_deadline(provider.create_cname(user_id, sub, root))
            .await
        {
            Ok(record) => {
                log::info!("Created CNAME {} for {hostname}", record.id);
                return Ok(Some(Provisioned {
                    record,
                    owned: true,
                }));
            }
            Err(e) if e.is_ambiguous() || matches!(e, ProviderError::RecordExists { .. }) => e,
            Err(e) => return Err(e.into()),
        };

        log::warn!("CNAME create for {hostname} did not settle ({err}), checking provider");
        let found = match self.with_deadline(provider.find_cname(sub, root)).await {
            Ok(found) => found,
            Err(find_err) if err.is_ambiguous() => {
                return Err(self.unsettled_create(hostname, &err, &find_err).await);
            }
            Err(find_err) => return Err(find_err.into()),
        };
        match found {
            Some(record) => {
                let owned = record.owner_tag() == Some(user_id);
                log::info!(
                    "Adopting CNAME {} for {hostname} (owned: {owned})",
                    record.id
                );
                Ok(Some(Provisioned { record, owned }))
            }
            None if err.is_ambiguous() => Err(err.into()),
            None => Ok(None),
        }
    }

    /// The create may have landed and the follow-up lookup failed too, so the
    /// provider may hold a record we cannot name.
    async fn unsettled_create(
        &self,
        hostname: &Hostname,
        create_err: &ProviderError,
        find_err: &ProviderError,
    ) -> CoreError {
        let full = hostname.full();
        let zone_id = UNKNOWN_ID.to_string();
        let detail = format!("create outcome unknown: {create_err}; lookup failed: {find_err}");
        log::error!("Reconciliation required for {full}: {detail}");

        let event = ReconciliationEvent::new(full, &zone_id, UNKNOWN_ID, detail.clone());
        if let Err(e) = self.ctx.journal().record(&event).await {
            log::error!("Failed to journal reconciliation event for {full}: {e}");
        }

        CoreError::ReconciliationRequired {
            hostname: full.to_string(),
            zone_id,
            record_id: UNKNOWN_ID.to_string(),
            detail,
        }
    }

    /// We created a CNAME but another request stored a different one first.
    async fn discard_redundant(&self, full: &str, ours: &Provisioned, winner: &DnsRecord) {
        if !ours.owned || ours.record.id == winner.id {
            return;
        }
        match self
            .with_deadline(
                self.ctx
                    .provider()
                    .delete_cname(&ours.record.zone_id, &ours.record.id),
            )
            .await
        {
            Ok(()) => log::info!("Removed redundant CNAME {} for {full}", ours.record.id),
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                self.journal_orphan(
                    full,
                    &ours.record,
                    format!("redundant record after lost insert race; delete failed: {e}"),
                )
                .await;
            }
        }
    }

    /// Compensate a failed `dns_records` insert by deleting the CNAME we hold.
    async fn roll_back(&self, full: &str, ours: &Provisioned, cause: CoreError) -> CoreError {
        if !ours.owned {
            return cause;
        }
        let record = &ours.record;
        match self
            .with_deadline(self.ctx.provider().delete_cname(&record.zone_id, &record.id))
            .await
        {
            Ok(()) => {
                log::warn!("Rolled back CNAME {} for {full}: {cause}", record.id);
                cause
            }
            Err(e) if e.is_not_found() => cause,
            Err(e) => {
                let detail = format!("dns record insert failed: {cause}; rollback failed: {e}");
                self.journal_orphan(full, record, detail.clone()).await;
                CoreError::ReconciliationRequired {
                    hostname: full.to_string(),
                    zone_id: record.zone_id.clone(),
                    record_id: record.id.clone(),
                    detail,
                }
            }
        }
    }

    async fn journal_orphan(&self, full: &str, record: &CnameRecord, detail: String) {
        log::error!(
            "Reconciliation required for {full}: CNAME {} in zone {}: {detail}",
            record.id,
            record.zone_id
        );
        let event = ReconciliationEvent::new(full, &record.zone_id, &record.id, detail);
        if let Err(e) = self.ctx.journal().record(&event).await {
            log::error!("Failed to journal reconciliation event for {full}: {e}");
        }
    }

    /// Remove the CNAME and its row for the last claim on a subdomain hostname.
    ///
    /// A provider `RecordNotFound` counts as removed; any other provider error
    /// aborts before the database is touched.
    async fn release_dns_record(&self, hostname: &Hostname) -> CoreResult<()> {
        let store = self.ctx.record_store();
        let full = hostname.full();

        let Some(record) = store
            .find_dns_record(full, LockScope::exclusive(LockResource::DnsRecords))
            .await?
        else {
            log::warn!("No dns record stored for {full}, skipping provider cleanup");
            return Ok(());
        };

        match self
            .with_deadline(
                self.ctx
                    .provider()
                    .delete_cname(&record.zone_id, &record.id),
            )
            .await
        {
            Ok(()) => log::info!("Deleted CNAME {} for {full}", record.id),
            Err(e) if e.is_not_found() => {
                log::warn!("CNAME {} for {full} was already gone", record.id);
            }
            Err(e) => return Err(e.into()),
        }

        store
            .delete_dns_record(full, LockScope::exclusive(LockResource::DnsRecords))
            .await?;
        Ok(())
    }

    /// Root availability under the same deadline as other provider calls.
    async fn root_is_available(&self, root: &str) -> CoreResult<bool> {
        let limit = self.options.provider_timeout;
        match tokio::time::timeout(limit, self.domains.is_available(root)).await {
            Ok(available) => available,
            Err(_) => Err(ProviderError::Timeout {
                provider: self.ctx.provider().id().to_string(),
                detail: format!(
                    "root domain lookup gave no response within {}ms",
                    limit.as_millis()
                ),
            }
            .into()),
        }
    }

    async fn with_deadline<T>(
        &self,
        call: impl Future<Output = spine_provider::Result<T>>,
    ) -> spine_provider::Result<T> {
        let limit = self.options.provider_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout {
                    provider: self.ctx.provider().id().to_string(),
                    detail: format!("no response within {}ms", limit.as_millis()),
                })
            })
    }
}
