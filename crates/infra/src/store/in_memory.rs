use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use poultrybook_accounting::{CashLog, DueRecord, Expense, SourceRef};
use poultrybook_core::{Entity, PoultryType, UserId};
use poultrybook_inventory::{LotArchive, ResetWatermarks};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

use super::{
    ArchiveLog, CashLogTable, Record, RecordStore, RecordTable, ResetTable, StoreError, StoreResult,
};

/// In-memory user-isolated table for tests/dev.
#[derive(Debug)]
pub struct InMemoryTable<T: Record> {
    rows: RwLock<HashMap<(UserId, T::Id), T>>,
}

impl<T: Record> InMemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn rows_of(&self, user: UserId) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows
            .iter()
            .filter_map(|((u, _id), row)| if *u == user { Some(row.clone()) } else { None })
            .collect())
    }
}

impl<T: Record> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: Record> RecordTable<T> for InMemoryTable<T> {
    async fn insert(&self, user: UserId, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = (user, record.id());
        if rows.contains_key(&key) {
            return Err(StoreError::Conflict(format!("duplicate id {}", record.id())));
        }
        rows.insert(key, record.clone());
        Ok(record)
    }

    async fn get(&self, user: UserId, id: T::Id) -> StoreResult<Option<T>> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.get(&(user, id)).cloned())
    }

    async fn list(&self, user: UserId) -> StoreResult<Vec<T>> {
        let mut rows = self.rows_of(user)?;
        rows.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        Ok(rows)
    }

    async fn update(&self, user: UserId, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        match rows.get_mut(&(user, record.id())) {
            Some(row) => {
                *row = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, user: UserId, id: T::Id) -> StoreResult<()> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        rows.remove(&(user, id)).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait::async_trait]
impl CashLogTable for InMemoryTable<CashLog> {
    async fn find_by_source(&self, user: UserId, source: SourceRef) -> StoreResult<Option<CashLog>> {
        Ok(self
            .rows_of(user)?
            .into_iter()
            .find(|log| log.source == Some(source)))
    }
}

#[derive(Debug, Default)]
struct InMemoryArchiveLog {
    rows: RwLock<Vec<(UserId, LotArchive)>>,
}

#[async_trait::async_trait]
impl ArchiveLog for InMemoryArchiveLog {
    async fn append(&self, user: UserId, archive: LotArchive) -> StoreResult<LotArchive> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        rows.push((user, archive.clone()));
        Ok(archive)
    }

    async fn list(&self, user: UserId) -> StoreResult<Vec<LotArchive>> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut archives: Vec<LotArchive> = rows
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, a)| a.clone())
            .collect();
        archives.sort_by_key(|a| std::cmp::Reverse(a.closed_at()));
        Ok(archives)
    }
}

#[derive(Debug, Default)]
struct InMemoryResetTable {
    marks: RwLock<HashMap<(UserId, PoultryType), DateTime<Utc>>>,
}

#[async_trait::async_trait]
impl ResetTable for InMemoryResetTable {
    async fn list(&self, user: UserId) -> StoreResult<ResetWatermarks> {
        let marks = self.marks.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(marks
            .iter()
            .filter(|((u, _), _)| *u == user)
            .map(|((_, ty), at)| (ty.clone(), *at))
            .collect())
    }

    async fn upsert(&self, user: UserId, poultry_type: PoultryType, at: DateTime<Utc>) -> StoreResult<()> {
        let mut marks = self.marks.write().map_err(|_| StoreError::LockPoisoned)?;
        marks.insert((user, poultry_type), at);
        Ok(())
    }
}

/// In-memory [`RecordStore`] for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    purchases: InMemoryTable<Purchase>,
    sales: InMemoryTable<Sale>,
    expenses: InMemoryTable<Expense>,
    dues: InMemoryTable<DueRecord>,
    cash_logs: InMemoryTable<CashLog>,
    archives: InMemoryArchiveLog,
    resets: InMemoryResetTable,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn purchases(&self) -> &dyn RecordTable<Purchase> {
        &self.purchases
    }

    fn sales(&self) -> &dyn RecordTable<Sale> {
        &self.sales
    }

    fn expenses(&self) -> &dyn RecordTable<Expense> {
        &self.expenses
    }

    fn dues(&self) -> &dyn RecordTable<DueRecord> {
        &self.dues
    }

    fn cash_logs(&self) -> &dyn CashLogTable {
        &self.cash_logs
    }

    fn archives(&self) -> &dyn ArchiveLog {
        &self.archives
    }

    fn resets(&self) -> &dyn ResetTable {
        &self.resets
    }
}
