//! `RecordStore` implementation for `SqlStore`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use spine_core::error::CoreResult;
use spine_core::traits::RecordStore;
use spine_core::types::{DnsRecord, Host, LockScope, NewHost};

use super::entity::{dns_record, host};
use super::{
    LockTarget, SqlStore, commit, format_timestamp, lock_rows, parse_timestamp, storage_error,
    write_error,
};

impl From<dns_record::Model> for DnsRecord {
    fn from(model: dns_record::Model) -> Self {
        Self {
            id: model.id,
            zone_id: model.zone_id,
            hostname: model.hostname,
        }
    }
}

impl host::Model {
    fn into_host(self) -> CoreResult<Host> {
        Ok(Host {
            id: i64::from(self.id),
            created_at: parse_timestamp("created_at", &self.created_at)?,
            sub: self.sub,
            root: self.root,
            user_id: self.user_id,
            dns_record_id: self.dns_record_id,
        })
    }
}

#[async_trait]
impl RecordStore for SqlStore {
    async fn find_dns_record(
        &self,
        hostname: &str,
        scope: LockScope,
    ) -> CoreResult<Option<DnsRecord>> {
        let txn = self.begin().await?;
        lock_rows(&txn, scope, &LockTarget::Hostname(hostname)).await?;

        let row = dns_record::Entity::find()
            .filter(dns_record::Column::Hostname.eq(hostname))
            .one(&txn)
            .await
            .map_err(|e| storage_error("query dns record", &e))?;

        commit(txn).await?;
        Ok(row.map(DnsRecord::from))
    }

    async fn insert_dns_record(&self, record: &DnsRecord) -> CoreResult<()> {
        let model = dns_record::ActiveModel {
            id: Set(record.id.clone()),
            zone_id: Set(record.zone_id.clone()),
            hostname: Set(record.hostname.clone()),
        };

        dns_record::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| write_error("insert dns record", &e))?;

        Ok(())
    }

    async fn delete_dns_record(&self, hostname: &str, scope: LockScope) -> CoreResult<u64> {
        let txn = self.begin().await?;
        lock_rows(&txn, scope, &LockTarget::Hostname(hostname)).await?;

        let result = dns_record::Entity::delete_many()
            .filter(dns_record::Column::Hostname.eq(hostname))
            .exec(&txn)
            .await
            .map_err(|e| storage_error("delete dns record", &e))?;

        commit(txn).await?;
        Ok(result.rows_affected)
    }

    async fn find_host(&self, sub: &str, root: &str, user_id: &str) -> CoreResult<Option<Host>> {
        let row = host::Entity::find()
            .filter(host::Column::Sub.eq(sub))
            .filter(host::Column::Root.eq(root))
            .filter(host::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| storage_error("query host", &e))?;

        row.map(host::Model::into_host).transpose()
    }

    async fn insert_host(&self, new_host: &NewHost, scope: LockScope) -> CoreResult<Host> {
        let txn = self.begin().await?;
        lock_rows(
            &txn,
            scope,
            &LockTarget::Parts {
                sub: &new_host.sub,
                root: &new_host.root,
            },
        )
        .await?;

        let model = host::ActiveModel {
            id: NotSet,
            sub: Set(new_host.sub.clone()),
            root: Set(new_host.root.clone()),
            user_id: Set(new_host.user_id.clone()),
            dns_record_id: Set(new_host.dns_record_id.clone()),
            created_at: Set(format_timestamp(chrono::Utc::now())),
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| write_error("insert host", &e))?;

        commit(txn).await?;
        inserted.into_host()
    }

    async fn delete_host(
        &self,
        sub: &str,
        root: &str,
        user_id: &str,
        scope: LockScope,
    ) -> CoreResult<u64> {
        let txn = self.begin().await?;
        lock_rows(&txn, scope, &LockTarget::Parts { sub, root }).await?;

        let result = host::Entity::delete_many()
            .filter(host::Column::Sub.eq(sub))
            .filter(host::Column::Root.eq(root))
            .filter(host::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| storage_error("delete host", &e))?;

        commit(txn).await?;
        Ok(result.rows_affected)
    }

    async fn count_hosts(&self, sub: &str, root: &str, scope: LockScope) -> CoreResult<u64> {
        let txn = self.begin().await?;
        lock_rows(&txn, scope, &LockTarget::Parts { sub, root }).await?;

        let count = host::Entity::find()
            .filter(host::Column::Sub.eq(sub))
            .filter(host::Column::Root.eq(root))
            .count(&txn)
            .await
            .map_err(|e| storage_error("count hosts", &e))?;

        commit(txn).await?;
        Ok(count)
    }

    async fn list_hosts(&self, user_id: &str) -> CoreResult<Vec<Host>> {
        let rows = host::Entity::find()
            .filter(host::Column::UserId.eq(user_id))
            .order_by_asc(host::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query hosts", &e))?;

        rows.into_iter().map(host::Model::into_host).collect()
    }
}

