use serde::{Deserialize, Serialize};

/// A CNAME record as it exists at the DNS provider.
///
/// `id` and `zone_id` are provider-assigned and are the only handles needed to
/// delete the record later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CnameRecord {
    /// Provider-assigned record identifier.
    pub id: String,
    /// Provider-assigned zone identifier of the root domain.
    pub zone_id: String,
    /// Fully-qualified record name (e.g. `i.sharify.me`).
    pub name: String,
    /// Alias target.
    pub content: String,
    /// Whether traffic is proxied through the provider's edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// Free-form audit comment (`created_by:<owner>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CnameRecord {
    /// Owner tag embedded in the audit comment, if the record was created by us.
    pub fn owner_tag(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .and_then(|c| c.strip_prefix(OWNER_COMMENT_PREFIX))
    }
}

/// Prefix of the audit comment attached to every CNAME we create.
pub const OWNER_COMMENT_PREFIX: &str = "created_by:";

/// Build the audit comment for a record owned by `owner_tag`.
pub fn owner_comment(owner_tag: &str) -> String {
    format!("{OWNER_COMMENT_PREFIX}{owner_tag}")
}
