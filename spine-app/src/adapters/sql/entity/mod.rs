//! `SeaORM` entities

pub mod dns_record;
pub mod host;
pub mod reconciliation_event;
