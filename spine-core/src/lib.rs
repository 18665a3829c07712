//! Spine Core Library
//!
//! Registration logic for the Spine hostname registry:
//! - Hostname parsing and subdomain sanitising
//! - Root-domain availability (Domain Service)
//! - Host registration / deletion, keeping provider CNAMEs and the database
//!   consistent (Registration Service)
//!
//! Storage and the DNS provider are abstracted behind traits so the same
//! logic runs against `SeaORM` in production and in-memory mocks in tests.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{DomainService, RegistrationOptions, RegistrationService, ServiceContext};
pub use traits::{RecordStore, ReconciliationJournal};
