//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use spine_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Malformed hostname or subdomain, rejected before any I/O
    #[error("Invalid hostname: {0}")]
    InvalidFormat(String),

    /// Root domain is not open for registration
    #[error("Root domain not available: {0}")]
    RootDomainUnavailable(String),

    /// Hostname is already claimed
    #[error("Hostname already claimed: {0}")]
    AlreadyClaimed(String),

    /// Unique constraint violated in the record store
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A provider record exists with no database backing and could not be rolled back.
    /// Operators must remove it by hand (see the reconciliation journal).
    #[error(
        "Reconciliation required for {hostname}: record {record_id} in zone {zone_id} ({detail})"
    )]
    ReconciliationRequired {
        hostname: String,
        zone_id: String,
        record_id: String,
        detail: String,
    },

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidFormat(_)
            | Self::RootDomainUnavailable(_)
            | Self::AlreadyClaimed(_)
            | Self::UniqueViolation(_)
            | Self::ValidationError(_) => true,
            Self::Provider(e) => e.is_expected(),
            Self::ReconciliationRequired { .. } | Self::StorageError(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
