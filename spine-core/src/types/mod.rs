//! 类型定义模块

mod host;
mod hostname;
mod lock;
mod reconciliation;

pub use host::{DnsRecord, Host, NewHost};
pub use hostname::{Hostname, sanitize_subdomain};
pub use lock::{LockResource, LockScope, LockStrength};
pub use reconciliation::ReconciliationEvent;
