//! 业务逻辑服务层

mod domain_service;
mod registration_service;

pub use domain_service::{DEFAULT_CACHE_TTL, DomainService};
pub use registration_service::{RegistrationOptions, RegistrationService};

use std::sync::Arc;

use spine_provider::CnameProvider;

use crate::traits::{RecordStore, ReconciliationJournal};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入具体的存储与 Provider 实现。
pub struct ServiceContext {
    record_store: Arc<dyn RecordStore>,
    provider: Arc<dyn CnameProvider>,
    journal: Arc<dyn ReconciliationJournal>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        record_store: Arc<dyn RecordStore>,
        provider: Arc<dyn CnameProvider>,
        journal: Arc<dyn ReconciliationJournal>,
    ) -> Self {
        Self {
            record_store,
            provider,
            journal,
        }
    }

    pub fn record_store(&self) -> &dyn RecordStore {
        self.record_store.as_ref()
    }

    pub fn provider(&self) -> &dyn CnameProvider {
        self.provider.as_ref()
    }

    pub fn journal(&self) -> &dyn ReconciliationJournal {
        self.journal.as_ref()
    }
}
