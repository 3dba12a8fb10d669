//! Record storage boundary.
//!
//! The engine only ever talks to storage through these entity-scoped
//! operations, every one of them keyed by the signed-in user. Any backend
//! exposing them (relational tables, a document store, the in-memory maps
//! below) can drive the engine.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use poultrybook_accounting::{CashLog, DueRecord, Expense, SourceRef};
use poultrybook_core::{Entity, PoultryType, UserId};
use poultrybook_inventory::{LotArchive, ResetWatermarks};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

pub use in_memory::{InMemoryRecordStore, InMemoryTable};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure. Propagated to the caller as-is, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// A row of one of the editable tables.
pub trait Record: Entity + Clone + Send + Sync + 'static {
    /// Business date then insert time; tables list newest first.
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>);
}

impl Record for Purchase {
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>) {
        (self.date, self.created_at)
    }
}

impl Record for Sale {
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>) {
        (self.date, self.created_at)
    }
}

impl Record for Expense {
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>) {
        (self.date, self.created_at)
    }
}

impl Record for DueRecord {
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>) {
        (self.date, self.created_at)
    }
}

impl Record for CashLog {
    fn sort_key(&self) -> (NaiveDate, Option<DateTime<Utc>>) {
        (self.date, Some(self.created_at))
    }
}

/// Create / read / update / delete over one editable table.
#[async_trait::async_trait]
pub trait RecordTable<T: Record>: Send + Sync {
    /// Insert a new row; an existing id is a [`StoreError::Conflict`].
    async fn insert(&self, user: UserId, record: T) -> StoreResult<T>;

    async fn get(&self, user: UserId, id: T::Id) -> StoreResult<Option<T>>;

    /// All rows of `user`, date descending.
    async fn list(&self, user: UserId) -> StoreResult<Vec<T>>;

    /// Replace an existing row; a missing id is [`StoreError::NotFound`].
    async fn update(&self, user: UserId, record: T) -> StoreResult<T>;

    async fn delete(&self, user: UserId, id: T::Id) -> StoreResult<()>;
}

/// Cash log table with the exact-match source lookup.
#[async_trait::async_trait]
pub trait CashLogTable: RecordTable<CashLog> {
    async fn find_by_source(&self, user: UserId, source: SourceRef) -> StoreResult<Option<CashLog>>;
}

/// Append-only lot history.
#[async_trait::async_trait]
pub trait ArchiveLog: Send + Sync {
    async fn append(&self, user: UserId, archive: LotArchive) -> StoreResult<LotArchive>;

    /// Newest close first.
    async fn list(&self, user: UserId) -> StoreResult<Vec<LotArchive>>;
}

/// Last reset time per poultry type.
#[async_trait::async_trait]
pub trait ResetTable: Send + Sync {
    async fn list(&self, user: UserId) -> StoreResult<ResetWatermarks>;

    async fn upsert(&self, user: UserId, poultry_type: PoultryType, at: DateTime<Utc>) -> StoreResult<()>;
}

/// The full persisted state layout.
pub trait RecordStore: Send + Sync {
    fn purchases(&self) -> &dyn RecordTable<Purchase>;
    fn sales(&self) -> &dyn RecordTable<Sale>;
    fn expenses(&self) -> &dyn RecordTable<Expense>;
    fn dues(&self) -> &dyn RecordTable<DueRecord>;
    fn cash_logs(&self) -> &dyn CashLogTable;
    fn archives(&self) -> &dyn ArchiveLog;
    fn resets(&self) -> &dyn ResetTable;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn purchases(&self) -> &dyn RecordTable<Purchase> {
        (**self).purchases()
    }

    fn sales(&self) -> &dyn RecordTable<Sale> {
        (**self).sales()
    }

    fn expenses(&self) -> &dyn RecordTable<Expense> {
        (**self).expenses()
    }

    fn dues(&self) -> &dyn RecordTable<DueRecord> {
        (**self).dues()
    }

    fn cash_logs(&self) -> &dyn CashLogTable {
        (**self).cash_logs()
    }

    fn archives(&self) -> &dyn ArchiveLog {
        (**self).archives()
    }

    fn resets(&self) -> &dyn ResetTable {
        (**self).resets()
    }
}
