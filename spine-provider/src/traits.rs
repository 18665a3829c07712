use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::CnameRecord;

/// An error code and message as returned in a provider's response envelope.
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    pub code: Option<String>,
    pub message: String,
}

impl RawApiError {
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// What the failed request was about, so mapped errors can name it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Full record name, for `RecordExists`
    pub record_name: Option<String>,
    /// Provider record id, for `RecordNotFound`
    pub record_id: Option<String>,
    /// Root domain, for `DomainNotFound`
    pub domain: Option<String>,
}

impl ErrorContext {
    /// Zone lookups and zone-wide listings.
    pub fn for_domain(root: &str) -> Self {
        Self {
            domain: Some(root.to_string()),
            ..Self::default()
        }
    }

    /// Creating or looking up `name` inside the `root` zone.
    pub fn for_record_name(name: &str, root: &str) -> Self {
        Self {
            record_name: Some(name.to_string()),
            domain: Some(root.to_string()),
            ..Self::default()
        }
    }

    /// Deleting a record by id.
    pub fn for_record_id(record_id: &str) -> Self {
        Self {
            record_id: Some(record_id.to_string()),
            ..Self::default()
        }
    }
}

/// Turns a provider's API error codes into [`ProviderError`].
pub(crate) trait ProviderErrorMapper {
    fn provider_name(&self) -> &'static str;

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 响应结构不符合预期
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 未映射的错误码
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// CNAME provisioning contract consumed by the registration coordinator.
///
/// Implementations talk to the external DNS provider. None of these calls are
/// transactional and none are retried by callers; the coordinator decides how
/// to compensate when one fails.
#[async_trait]
pub trait CnameProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Check that the configured credentials are accepted by the provider.
    async fn validate_credentials(&self) -> Result<bool>;

    /// Create a proxied CNAME `sub.root -> root`, tagged with `owner_tag` for audit.
    ///
    /// Returns the provider-assigned record and zone identifiers.
    async fn create_cname(&self, owner_tag: &str, sub: &str, root: &str) -> Result<CnameRecord>;

    /// Delete a CNAME by its provider identifiers.
    ///
    /// Fails with [`ProviderError::RecordNotFound`] when the record is already gone.
    async fn delete_cname(&self, zone_id: &str, record_id: &str) -> Result<()>;

    /// Look up the CNAME for `sub.root`, if one exists at the provider.
    ///
    /// Used to settle creates whose outcome is unknown (timeouts, dropped connections).
    async fn find_cname(&self, sub: &str, root: &str) -> Result<Option<CnameRecord>>;

    /// Root domains that carry an A record tagged as available for user subdomains.
    async fn list_available_root_domains(&self) -> Result<Vec<String>>;
}
