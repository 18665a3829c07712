//! Reconciliation events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A provider record that exists without database backing.
///
/// Written when a CNAME was created, the database insert failed and the
/// compensating delete failed too. Stays pending until an operator resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationEvent {
    pub id: String,
    pub hostname: String,
    pub zone_id: String,
    pub record_id: String,
    pub detail: String,
    pub occurred_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ReconciliationEvent {
    pub fn new(hostname: &str, zone_id: &str, record_id: &str, detail: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            hostname: hostname.to_string(),
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            detail: detail.into(),
            occurred_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.resolved_at.is_none()
    }
}
