//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use spine_provider::{CnameProvider, CnameRecord, ProviderError, owner_comment};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainService, RegistrationOptions, RegistrationService, ServiceContext};
use crate::traits::{RecordStore, ReconciliationJournal};
use crate::types::{DnsRecord, Host, LockScope, NewHost, ReconciliationEvent};

// ===== MockRecordStore =====

#[derive(Default)]
struct StoreState {
    dns_records: Vec<DnsRecord>,
    hosts: Vec<Host>,
    next_host_id: i64,
}

impl StoreState {
    fn push_host(&mut self, host: &NewHost) -> Host {
        self.next_host_id += 1;
        let host = Host {
            id: self.next_host_id,
            sub: host.sub.clone(),
            root: host.root.clone(),
            user_id: host.user_id.clone(),
            dns_record_id: host.dns_record_id.clone(),
            created_at: Utc::now(),
        };
        self.hosts.push(host.clone());
        host
    }
}

/// 内存版 `RecordStore`，约束与 SQL schema 一致
/// （hostname 唯一、(sub, root, user_id) 唯一、dns_record_id 唯一且外键 SET NULL）
pub struct MockRecordStore {
    state: RwLock<StoreState>,
    locks: RwLock<Vec<(&'static str, LockScope)>>,
    /// 如果 Some，insert_dns_record 返回此存储错误
    insert_dns_record_error: RwLock<Option<String>>,
    /// 如果 Some，insert_host 返回此存储错误
    insert_host_error: RwLock<Option<String>>,
    /// 如果 Some，下一次 insert_dns_record 先写入此记录再报唯一冲突
    race_winner: RwLock<Option<DnsRecord>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            locks: RwLock::new(Vec::new()),
            insert_dns_record_error: RwLock::new(None),
            insert_host_error: RwLock::new(None),
            race_winner: RwLock::new(None),
        }
    }

    pub async fn set_insert_dns_record_error(&self, err: Option<String>) {
        *self.insert_dns_record_error.write().await = err;
    }

    pub async fn set_insert_host_error(&self, err: Option<String>) {
        *self.insert_host_error.write().await = err;
    }

    pub async fn simulate_insert_race(&self, winner: DnsRecord) {
        *self.race_winner.write().await = Some(winner);
    }

    /// 绕过唯一约束直接写入 host
    pub async fn seed_host(&self, sub: &str, root: &str, user_id: &str, dns_record_id: Option<&str>) {
        self.state.write().await.push_host(&NewHost {
            sub: sub.to_string(),
            root: root.to_string(),
            user_id: user_id.to_string(),
            dns_record_id: dns_record_id.map(String::from),
        });
    }

    pub async fn dns_record(&self, hostname: &str) -> Option<DnsRecord> {
        self.state
            .read()
            .await
            .dns_records
            .iter()
            .find(|r| r.hostname == hostname)
            .cloned()
    }

    pub async fn dns_record_count(&self) -> usize {
        self.state.read().await.dns_records.len()
    }

    pub async fn host_count(&self) -> usize {
        self.state.read().await.hosts.len()
    }

    pub async fn lock_log(&self) -> Vec<(&'static str, LockScope)> {
        self.locks.read().await.clone()
    }

    async fn lock(&self, op: &'static str, scope: LockScope) {
        self.locks.write().await.push((op, scope));
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn find_dns_record(
        &self,
        hostname: &str,
        scope: LockScope,
    ) -> CoreResult<Option<DnsRecord>> {
        self.lock("find_dns_record", scope).await;
        Ok(self.dns_record(hostname).await)
    }

    async fn insert_dns_record(&self, record: &DnsRecord) -> CoreResult<()> {
        if let Some(ref msg) = *self.insert_dns_record_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut state = self.state.write().await;
        if let Some(winner) = self.race_winner.write().await.take() {
            state.dns_records.push(winner);
            return Err(CoreError::UniqueViolation(format!(
                "dns_records.hostname = {}",
                record.hostname
            )));
        }
        if state
            .dns_records
            .iter()
            .any(|r| r.hostname == record.hostname || r.id == record.id)
        {
            return Err(CoreError::UniqueViolation(format!(
                "dns_records.hostname = {}",
                record.hostname
            )));
        }
        state.dns_records.push(record.clone());
        Ok(())
    }

    async fn delete_dns_record(&self, hostname: &str, scope: LockScope) -> CoreResult<u64> {
        self.lock("delete_dns_record", scope).await;
        let mut state = self.state.write().await;
        let removed: Vec<String> = state
            .dns_records
            .iter()
            .filter(|r| r.hostname == hostname)
            .map(|r| r.id.clone())
            .collect();
        state.dns_records.retain(|r| r.hostname != hostname);
        for host in &mut state.hosts {
            if host
                .dns_record_id
                .as_ref()
                .is_some_and(|id| removed.contains(id))
            {
                host.dns_record_id = None;
            }
        }
        Ok(removed.len() as u64)
    }

    async fn find_host(&self, sub: &str, root: &str, user_id: &str) -> CoreResult<Option<Host>> {
        Ok(self
            .state
            .read()
            .await
            .hosts
            .iter()
            .find(|h| h.sub == sub && h.root == root && h.user_id == user_id)
            .cloned())
    }

    async fn insert_host(&self, host: &NewHost, scope: LockScope) -> CoreResult<Host> {
        self.lock("insert_host", scope).await;
        if let Some(ref msg) = *self.insert_host_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        let mut state = self.state.write().await;
        if state
            .hosts
            .iter()
            .any(|h| h.sub == host.sub && h.root == host.root && h.user_id == host.user_id)
        {
            return Err(CoreError::UniqueViolation("hosts(sub, root, user_id)".into()));
        }
        if let Some(ref record_id) = host.dns_record_id {
            if state
                .hosts
                .iter()
                .any(|h| h.dns_record_id.as_ref() == Some(record_id))
            {
                return Err(CoreError::UniqueViolation("hosts.dns_record_id".into()));
            }
            if !state.dns_records.iter().any(|r| &r.id == record_id) {
                return Err(CoreError::StorageError(format!(
                    "foreign key: dns record {record_id} does not exist"
                )));
            }
        }
        Ok(state.push_host(host))
    }

    async fn delete_host(
        &self,
        sub: &str,
        root: &str,
        user_id: &str,
        scope: LockScope,
    ) -> CoreResult<u64> {
        self.lock("delete_host", scope).await;
        let mut state = self.state.write().await;
        let before = state.hosts.len();
        state
            .hosts
            .retain(|h| !(h.sub == sub && h.root == root && h.user_id == user_id));
        Ok((before - state.hosts.len()) as u64)
    }

    async fn count_hosts(&self, sub: &str, root: &str, scope: LockScope) -> CoreResult<u64> {
        self.lock("count_hosts", scope).await;
        let state = self.state.read().await;
        Ok(state
            .hosts
            .iter()
            .filter(|h| h.sub == sub && h.root == root)
            .count() as u64)
    }

    async fn list_hosts(&self, user_id: &str) -> CoreResult<Vec<Host>> {
        let state = self.state.read().await;
        let mut hosts: Vec<Host> = state
            .hosts
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        hosts.sort_by_key(|h| h.id);
        Ok(hosts)
    }
}

// ===== MockCnameProvider =====

pub struct MockCnameProvider {
    /// full hostname -> record
    cnames: RwLock<HashMap<String, CnameRecord>>,
    available: RwLock<Vec<String>>,
    create_calls: RwLock<Vec<(String, String, String)>>,
    delete_calls: RwLock<Vec<(String, String)>>,
    find_calls: AtomicUsize,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    create_error: RwLock<Option<ProviderError>>,
    /// 注入 create_error 时记录是否仍然落地（模拟响应丢失）
    create_lands_on_error: AtomicBool,
    /// 记录落地后延迟返回
    create_delay: RwLock<Option<Duration>>,
    delete_error: RwLock<Option<ProviderError>>,
    find_error: RwLock<Option<ProviderError>>,
    list_error: RwLock<Option<ProviderError>>,
    list_delay: RwLock<Option<Duration>>,
}

impl MockCnameProvider {
    pub fn new() -> Self {
        Self {
            cnames: RwLock::new(HashMap::new()),
            available: RwLock::new(vec!["sharify.me".to_string()]),
            create_calls: RwLock::new(Vec::new()),
            delete_calls: RwLock::new(Vec::new()),
            find_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
            create_error: RwLock::new(None),
            create_lands_on_error: AtomicBool::new(false),
            create_delay: RwLock::new(None),
            delete_error: RwLock::new(None),
            find_error: RwLock::new(None),
            list_error: RwLock::new(None),
            list_delay: RwLock::new(None),
        }
    }

    pub async fn set_available_domains(&self, domains: &[&str]) {
        let mut domains: Vec<String> = domains.iter().map(ToString::to_string).collect();
        domains.sort();
        *self.available.write().await = domains;
    }

    pub async fn set_create_error(&self, err: Option<ProviderError>) {
        *self.create_error.write().await = err;
    }

    pub async fn set_create_lands_on_error(&self, lands: bool) {
        self.create_lands_on_error.store(lands, Ordering::SeqCst);
    }

    pub async fn set_create_delay(&self, delay: Option<Duration>) {
        *self.create_delay.write().await = delay;
    }

    pub async fn set_delete_error(&self, err: Option<ProviderError>) {
        *self.delete_error.write().await = err;
    }

    pub async fn set_find_error(&self, err: Option<ProviderError>) {
        *self.find_error.write().await = err;
    }

    pub async fn set_list_error(&self, err: Option<ProviderError>) {
        *self.list_error.write().await = err;
    }

    pub async fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.write().await = delay;
    }

    /// 直接在 "provider" 侧放一条记录
    pub async fn seed_cname(&self, owner_tag: &str, sub: &str, root: &str) -> CnameRecord {
        let record = self.make_record(owner_tag, sub, root);
        self.cnames
            .write()
            .await
            .insert(record.name.clone(), record.clone());
        record
    }

    pub async fn create_calls(&self) -> Vec<(String, String, String)> {
        self.create_calls.read().await.clone()
    }

    /// (zone_id, record_id)
    pub async fn delete_calls(&self) -> Vec<(String, String)> {
        self.delete_calls.read().await.clone()
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub async fn cname_count(&self) -> usize {
        self.cnames.read().await.len()
    }

    fn make_record(&self, owner_tag: &str, sub: &str, root: &str) -> CnameRecord {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        CnameRecord {
            id: format!("rec-{n}"),
            zone_id: format!("zone-{root}"),
            name: format!("{sub}.{root}"),
            content: root.to_string(),
            proxied: Some(true),
            comment: Some(owner_comment(owner_tag)),
        }
    }
}

#[async_trait]
impl CnameProvider for MockCnameProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn validate_credentials(&self) -> spine_provider::Result<bool> {
        Ok(true)
    }

    async fn create_cname(
        &self,
        owner_tag: &str,
        sub: &str,
        root: &str,
    ) -> spine_provider::Result<CnameRecord> {
        self.create_calls.write().await.push((
            owner_tag.to_string(),
            sub.to_string(),
            root.to_string(),
        ));
        let full = format!("{sub}.{root}");

        let record = {
            let mut cnames = self.cnames.write().await;
            if let Some(err) = self.create_error.read().await.clone() {
                if self.create_lands_on_error.load(Ordering::SeqCst) && !cnames.contains_key(&full)
                {
                    let record = self.make_record(owner_tag, sub, root);
                    cnames.insert(full, record);
                }
                return Err(err);
            }
            if cnames.contains_key(&full) {
                return Err(ProviderError::RecordExists {
                    provider: "mock".into(),
                    record_name: full,
                    raw_message: None,
                });
            }
            let record = self.make_record(owner_tag, sub, root);
            cnames.insert(full, record.clone());
            record
        };

        let delay = *self.create_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(record)
    }

    async fn delete_cname(&self, zone_id: &str, record_id: &str) -> spine_provider::Result<()> {
        self.delete_calls
            .write()
            .await
            .push((zone_id.to_string(), record_id.to_string()));
        if let Some(err) = self.delete_error.read().await.clone() {
            return Err(err);
        }
        let mut cnames = self.cnames.write().await;
        let before = cnames.len();
        cnames.retain(|_, r| !(r.id == record_id && r.zone_id == zone_id));
        if cnames.len() == before {
            return Err(ProviderError::RecordNotFound {
                provider: "mock".into(),
                record_id: record_id.to_string(),
                raw_message: None,
            });
        }
        Ok(())
    }

    async fn find_cname(&self, sub: &str, root: &str) -> spine_provider::Result<Option<CnameRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.find_error.read().await.clone() {
            return Err(err);
        }
        Ok(self
            .cnames
            .read()
            .await
            .get(&format!("{sub}.{root}"))
            .cloned())
    }

    async fn list_available_root_domains(&self) -> spine_provider::Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.list_error.read().await.clone() {
            return Err(err);
        }
        Ok(self.available.read().await.clone())
    }
}

// ===== MockReconciliationJournal =====

pub struct MockReconciliationJournal {
    events: RwLock<Vec<ReconciliationEvent>>,
}

impl MockReconciliationJournal {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<ReconciliationEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl ReconciliationJournal for MockReconciliationJournal {
    async fn record(&self, event: &ReconciliationEvent) -> CoreResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list_pending(&self) -> CoreResult<Vec<ReconciliationEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.is_pending())
            .cloned()
            .collect())
    }

    async fn resolve(&self, id: &str) -> CoreResult<bool> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == id && e.is_pending()) {
            Some(event) => {
                event.resolved_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ===== 工厂方法 =====

/// 创建测试用 `ServiceContext`
pub fn create_test_context() -> (
    Arc<ServiceContext>,
    Arc<MockRecordStore>,
    Arc<MockCnameProvider>,
    Arc<MockReconciliationJournal>,
) {
    let store = Arc::new(MockRecordStore::new());
    let provider = Arc::new(MockCnameProvider::new());
    let journal = Arc::new(MockReconciliationJournal::new());

    let ctx = Arc::new(ServiceContext::new(
        store.clone(),
        provider.clone(),
        journal.clone(),
    ));

    (ctx, store, provider, journal)
}

/// 创建测试用 `RegistrationService`
pub fn create_test_registration_service() -> (
    RegistrationService,
    Arc<MockRecordStore>,
    Arc<MockCnameProvider>,
    Arc<MockReconciliationJournal>,
) {
    let (ctx, store, provider, journal) = create_test_context();
    let domains = Arc::new(DomainService::new(ctx.clone(), Duration::from_secs(60)));
    let service = RegistrationService::new(ctx, domains, RegistrationOptions::default());
    (service, store, provider, journal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn journal_resolve_marks_event_once() {
        let journal = MockReconciliationJournal::new();
        let event = ReconciliationEvent::new("i.sharify.me", "zone-1", "rec-1", "rollback failed");
        journal.record(&event).await.unwrap();

        assert_eq!(journal.list_pending().await.unwrap().len(), 1);
        assert!(journal.resolve(&event.id).await.unwrap());
        assert!(!journal.resolve(&event.id).await.unwrap());
        assert!(journal.list_pending().await.unwrap().is_empty());
    }
}
