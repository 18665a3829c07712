//! SQL-backed store using `SeaORM`.
//!
//! A single `SqlStore` implements `RecordStore` and `ReconciliationJournal`
//! against SQLite, MySQL or PostgreSQL. Schema migrations run on connect.

mod journal;
mod record_store;
pub(crate) mod entity;
mod migration;

use std::path::Path;

use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, EntityTrait, QueryFilter, QuerySelect, Select, SqlErr, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use spine_core::error::{CoreError, CoreResult};
use spine_core::types::{LockResource, LockScope, LockStrength};

use entity::{dns_record, host};
use migration::Migrator;

/// Relational store for hosts, DNS records and reconciliation events.
pub struct SqlStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqlStore {
    /// Connect to `database_url` and bring the schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> CoreResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to database: {e}")))?;

        let store = Self { db };

        Migrator::up(&store.db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::info!(
            "Connected to {:?} database, schema up to date",
            store.db.get_database_backend()
        );
        Ok(store)
    }

    /// Open (creating if needed) a `SQLite` database file.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, connection or
    /// migration fails.
    pub async fn open_sqlite(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        Self::connect(&format!("sqlite://{}?mode=rwc", db_path.display())).await
    }

    pub(crate) async fn begin(&self) -> CoreResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to begin transaction: {e}")))
    }
}

/// Rows a lock scope applies to.
pub(crate) enum LockTarget<'a> {
    /// A full hostname, e.g. `i.sharify.me`
    Hostname(&'a str),
    /// `(sub, root)` as stored on hosts
    Parts { sub: &'a str, root: &'a str },
}

impl LockTarget<'_> {
    fn hostname(&self) -> String {
        match self {
            Self::Hostname(name) => (*name).to_string(),
            Self::Parts { sub, root } if sub.is_empty() => (*root).to_string(),
            Self::Parts { sub, root } => format!("{sub}.{root}"),
        }
    }

    fn parts(&self) -> (String, String) {
        match self {
            Self::Hostname(name) => match name.split_once('.') {
                // 两段即为根域名本身
                Some((_, rest)) if !rest.contains('.') => (String::new(), (*name).to_string()),
                Some((sub, root)) => (sub.to_string(), root.to_string()),
                None => (String::new(), (*name).to_string()),
            },
            Self::Parts { sub, root } => ((*sub).to_string(), (*root).to_string()),
        }
    }
}

fn with_lock<E: EntityTrait>(query: Select<E>, strength: LockStrength) -> Select<E> {
    match strength {
        LockStrength::Shared => query.lock_shared(),
        LockStrength::Exclusive => query.lock_exclusive(),
    }
}

/// Lock the rows `scope` names inside `txn`.
///
/// `SQLite` has no row locks; it serialises writers on the database file, so
/// the locking read is skipped there.
pub(crate) async fn lock_rows(
    txn: &DatabaseTransaction,
    scope: LockScope,
    target: &LockTarget<'_>,
) -> CoreResult<()> {
    if txn.get_database_backend() == DbBackend::Sqlite {
        return Ok(());
    }

    let locked = match scope.resource {
        LockResource::DnsRecords => with_lock(
            dns_record::Entity::find()
                .filter(dns_record::Column::Hostname.eq(target.hostname())),
            scope.strength,
        )
        .all(txn)
        .await
        .map(|rows| rows.len()),
        LockResource::Hosts => {
            let (sub, root) = target.parts();
            with_lock(
                host::Entity::find()
                    .filter(host::Column::Sub.eq(sub))
                    .filter(host::Column::Root.eq(root)),
                scope.strength,
            )
            .all(txn)
            .await
            .map(|rows| rows.len())
        }
    }
    .map_err(|e| CoreError::StorageError(format!("Failed to lock {scope}: {e}")))?;

    log::debug!("Locked {locked} row(s) under {scope}");
    Ok(())
}

/// Map a write error, keeping unique violations distinguishable.
pub(crate) fn write_error(action: &str, e: &DbErr) -> CoreError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => CoreError::UniqueViolation(detail),
        _ => CoreError::StorageError(format!("Failed to {action}: {e}")),
    }
}

pub(crate) fn storage_error(action: &str, e: &DbErr) -> CoreError {
    CoreError::StorageError(format!("Failed to {action}: {e}"))
}

pub(crate) async fn commit(txn: DatabaseTransaction) -> CoreResult<()> {
    txn.commit()
        .await
        .map_err(|e| storage_error("commit transaction", &e))
}

/// RFC 3339 with fixed-width micros, so stored timestamps sort as text.
pub(crate) fn format_timestamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(
    field: &str,
    value: &str,
) -> CoreResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| CoreError::StorageError(format!("Invalid {field}: {e}")))
}
