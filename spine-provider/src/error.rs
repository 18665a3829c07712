use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a [`CnameProvider`](crate::CnameProvider).
///
/// Every variant names the provider it came from. Variants that carry a
/// `raw_message` keep the provider's own wording for operators.
///
/// Transport failures ([`NetworkError`](Self::NetworkError),
/// [`Timeout`](Self::Timeout)) and [`RateLimited`](Self::RateLimited) are
/// transient. Only read-only requests are retried on them; a create or delete
/// that failed this way is reported as-is and settled by the caller.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection refused, reset, or a 502/503/504 from the edge.
    #[error("[{provider}] Network error: {detail}")]
    NetworkError { provider: String, detail: String },

    /// API token rejected.
    #[error("[{provider}] Invalid credentials{}", suffix(.raw_message))]
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    /// A record with this name already exists in the zone.
    #[error("[{provider}] Record '{record_name}' already exists")]
    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    /// The record id is unknown to the provider (already deleted).
    #[error("[{provider}] Record '{record_id}' not found")]
    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Invalid parameter '{param}': {detail}")]
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    /// Zone record quota reached. Not transient.
    #[error("[{provider}] Quota exceeded")]
    QuotaExceeded {
        provider: String,
        raw_message: Option<String>,
    },

    /// HTTP 429 or an equivalent API error code.
    #[error("[{provider}] Rate limited{}", retry_suffix(.retry_after))]
    RateLimited {
        provider: String,
        /// Seconds, from `Retry-After`
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    /// No response within the request or call deadline.
    #[error("[{provider}] Request timeout: {detail}")]
    Timeout { provider: String, detail: String },

    /// No zone for the root domain in this account.
    #[error("[{provider}] Domain '{domain}' not found{}", suffix(.raw_message))]
    DomainNotFound {
        provider: String,
        domain: String,
        raw_message: Option<String>,
    },

    /// Token valid but missing a permission (e.g. DNS:Edit).
    #[error("[{provider}] Permission denied{}", suffix(.raw_message))]
    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// Response body did not match the expected envelope.
    #[error("[{provider}] Parse error: {detail}")]
    ParseError { provider: String, detail: String },

    /// An API error code with no mapping above.
    #[error("[{provider}] {raw_message}")]
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

fn suffix(raw_message: &Option<String>) -> String {
    raw_message
        .as_ref()
        .map(|msg| format!(": {msg}"))
        .unwrap_or_default()
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl ProviderError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
                | Self::DomainNotFound { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Whether the outcome of a mutating request is unknown.
    ///
    /// A create that failed this way may still have taken effect at the provider,
    /// so callers must look the record up before assuming it does not exist.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    /// Whether the error reports that the target record is already gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
