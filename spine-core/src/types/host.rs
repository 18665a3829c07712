//! Host / DNS record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Hostname;

/// Provider CNAME backing a subdomain hostname, shared by every claim of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Provider record id
    pub id: String,
    pub zone_id: String,
    /// Full hostname, unique
    pub hostname: String,
}

/// A user's claim on a hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: i64,
    pub sub: String,
    pub root: String,
    pub user_id: String,
    /// `None` iff `sub` is empty
    pub dns_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Host {
    /// `sub.root`, or `root` for a root-only claim
    pub fn full(&self) -> String {
        if self.sub.is_empty() {
            self.root.clone()
        } else {
            format!("{}.{}", self.sub, self.root)
        }
    }
}

/// Host row to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHost {
    pub sub: String,
    pub root: String,
    pub user_id: String,
    pub dns_record_id: Option<String>,
}

impl NewHost {
    pub fn new(hostname: &Hostname, user_id: &str, dns_record_id: Option<String>) -> Self {
        Self {
            sub: hostname.sub().to_string(),
            root: hostname.root().to_string(),
            user_id: user_id.to_string(),
            dns_record_id,
        }
    }
}
