//! Record store abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{DnsRecord, Host, LockScope, NewHost};

/// Persistence for `dns_records` and `hosts`.
///
/// Each call runs in its own transaction. Calls that take a [`LockScope`]
/// lock the named table's rows for the duration of that transaction before
/// doing their work; backends without row locks may ignore the scope.
///
/// Platform implementation:
/// - `spine-app`: `SqlStore` (`SeaORM`)
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up the DNS record for a full hostname.
    async fn find_dns_record(
        &self,
        hostname: &str,
        scope: LockScope,
    ) -> CoreResult<Option<DnsRecord>>;

    /// Insert a DNS record.
    ///
    /// Fails with `CoreError::UniqueViolation` when a record for the same
    /// hostname (or with the same id) already exists.
    async fn insert_dns_record(&self, record: &DnsRecord) -> CoreResult<()>;

    /// Delete the DNS record for a full hostname. Returns rows removed.
    async fn delete_dns_record(&self, hostname: &str, scope: LockScope) -> CoreResult<u64>;

    /// Look up one user's claim on `(sub, root)`.
    async fn find_host(&self, sub: &str, root: &str, user_id: &str) -> CoreResult<Option<Host>>;

    /// Insert a host.
    ///
    /// `scope` locks the referenced DNS record so it cannot be deleted while
    /// the host is written. Fails with `CoreError::UniqueViolation` when the
    /// claim collides with an existing one.
    async fn insert_host(&self, host: &NewHost, scope: LockScope) -> CoreResult<Host>;

    /// Delete one user's claim on `(sub, root)`. Returns rows removed.
    async fn delete_host(
        &self,
        sub: &str,
        root: &str,
        user_id: &str,
        scope: LockScope,
    ) -> CoreResult<u64>;

    /// Count claims on `(sub, root)` across all users.
    async fn count_hosts(&self, sub: &str, root: &str, scope: LockScope) -> CoreResult<u64>;

    /// All hosts claimed by a user, ordered by id.
    async fn list_hosts(&self, user_id: &str) -> CoreResult<Vec<Host>>;
}
