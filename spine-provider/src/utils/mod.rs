//! Utility modules.

/// Log-safe rendering of response bodies and credentials.
pub mod log_sanitizer;
