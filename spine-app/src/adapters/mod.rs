//! Storage adapters

mod sql;

pub use sql::SqlStore;
