//! `ReconciliationJournal` implementation for `SqlStore`.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, sea_query::Expr,
};

use spine_core::error::CoreResult;
use spine_core::traits::ReconciliationJournal;
use spine_core::types::ReconciliationEvent;

use super::entity::reconciliation_event;
use super::{SqlStore, format_timestamp, parse_timestamp, storage_error};

impl reconciliation_event::Model {
    fn into_event(self) -> CoreResult<ReconciliationEvent> {
        let occurred_at = parse_timestamp("occurred_at", &self.occurred_at)?;
        let resolved_at = self
            .resolved_at
            .map(|s| parse_timestamp("resolved_at", &s))
            .transpose()?;

        Ok(ReconciliationEvent {
            id: self.id,
            hostname: self.hostname,
            zone_id: self.zone_id,
            record_id: self.record_id,
            detail: self.detail,
            occurred_at,
            resolved_at,
        })
    }
}

#[async_trait]
impl ReconciliationJournal for SqlStore {
    async fn record(&self, event: &ReconciliationEvent) -> CoreResult<()> {
        let model = reconciliation_event::ActiveModel {
            id: Set(event.id.clone()),
            hostname: Set(event.hostname.clone()),
            zone_id: Set(event.zone_id.clone()),
            record_id: Set(event.record_id.clone()),
            detail: Set(event.detail.clone()),
            occurred_at: Set(format_timestamp(event.occurred_at)),
            resolved_at: Set(event.resolved_at.map(format_timestamp)),
        };

        reconciliation_event::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| storage_error("record reconciliation event", &e))?;

        Ok(())
    }

    async fn list_pending(&self) -> CoreResult<Vec<ReconciliationEvent>> {
        let rows = reconciliation_event::Entity::find()
            .filter(reconciliation_event::Column::ResolvedAt.is_null())
            .order_by_asc(reconciliation_event::Column::OccurredAt)
            .order_by_asc(reconciliation_event::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query reconciliation events", &e))?;

        rows.into_iter()
            .map(reconciliation_event::Model::into_event)
            .collect()
    }

    async fn resolve(&self, id: &str) -> CoreResult<bool> {
        let result = reconciliation_event::Entity::update_many()
            .col_expr(
                reconciliation_event::Column::ResolvedAt,
                Expr::value(format_timestamp(chrono::Utc::now())),
            )
            .filter(reconciliation_event::Column::Id.eq(id))
            .filter(reconciliation_event::Column::ResolvedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error("resolve reconciliation event", &e))?;

        Ok(result.rows_affected > 0)
    }
}
