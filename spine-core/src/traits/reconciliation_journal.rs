//! Reconciliation journal Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::ReconciliationEvent;

/// Durable log of provider records that lost their database backing.
#[async_trait]
pub trait ReconciliationJournal: Send + Sync {
    /// Persist an event.
    async fn record(&self, event: &ReconciliationEvent) -> CoreResult<()>;

    /// Events not yet resolved, oldest first.
    async fn list_pending(&self) -> CoreResult<Vec<ReconciliationEvent>>;

    /// Mark an event as resolved. Returns `false` if it was unknown or already resolved.
    async fn resolve(&self, id: &str) -> CoreResult<bool>;
}
