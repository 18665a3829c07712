//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod cloudflare;

pub use cloudflare::{CloudflareProvider, DEFAULT_AVAILABILITY_TAG};
