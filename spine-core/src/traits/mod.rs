//! Storage layer abstraction trait definition

mod reconciliation_journal;
mod record_store;

pub use reconciliation_journal::ReconciliationJournal;
pub use record_store::RecordStore;
