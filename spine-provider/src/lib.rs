//! # spine-provider
//!
//! DNS provider adapter for the Spine hostname registry.
//!
//! Spine hands out `sub.root` hostnames to users. For every claimed subdomain
//! a proxied CNAME `sub.root -> root` must exist at the DNS provider; this
//! crate owns that side of the bargain through the [`CnameProvider`] trait and
//! its Cloudflare implementation, [`CloudflareProvider`].
//!
//! ## TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spine_provider::{CloudflareProvider, CnameProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = CloudflareProvider::new("your-token")?.with_availability_tag("spine");
//!
//!     if !provider.validate_credentials().await? {
//!         return Err("token rejected".into());
//!     }
//!
//!     let roots = provider.list_available_root_domains().await?;
//!     println!("open for registration: {roots:?}");
//!
//!     let record = provider.create_cname("user-42", "i", "sharify.me").await?;
//!     provider.delete_cname(&record.zone_id, &record.id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError).
//! [`ProviderError::is_ambiguous`] flags failures after which a mutating
//! request may or may not have been applied; read-only requests are retried
//! with exponential backoff, mutating requests are sent exactly once.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use traits::CnameProvider;

pub use types::{CnameRecord, OWNER_COMMENT_PREFIX, owner_comment};

pub use providers::{CloudflareProvider, DEFAULT_AVAILABILITY_TAG};
pub use providers::common::normalize_domain_name;

pub use utils::log_sanitizer::{mask_secret, truncate_for_log};
