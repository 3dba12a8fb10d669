//! Keeps the cash log in lockstep with the records that move cash.
//!
//! Ordering rule: on add/update the primary record is written first and the
//! cash entry after it; on delete the cash entry goes first. A store failure
//! therefore never leaves a cash entry pointing at a record that was never
//! written.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use poultrybook_accounting::{
    BanknoteSet, CashCount, CashEffect, CashEntryDraft, CashEntryKind, CashLog, Denominations,
    LinkAction, SourceRef, cash_balance, plan_link, reconcile_count,
};
use poultrybook_core::{CashLogId, Clock, DomainError, UserId};

use crate::error::{EngineError, EngineResult};
use crate::store::RecordStore;

pub struct CashLedgerSync<'a> {
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
}

impl<'a> CashLedgerSync<'a> {
    pub fn new(store: &'a dyn RecordStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    async fn insert(&self, user: UserId, draft: CashEntryDraft) -> EngineResult<CashLog> {
        draft.validate()?;
        let log = draft.record(CashLogId::new(), self.clock.now());
        Ok(self.store.cash_logs().insert(user, log).await?)
    }

    /// Bring the linked entry of `record` in line with its current cash effect.
    ///
    /// `expected` says whether a link should already exist; a missing one is
    /// logged and then treated as "nothing to unlink".
    pub async fn sync_link<R>(&self, user: UserId, record: &R, expected: bool) -> EngineResult<LinkAction>
    where
        R: CashEffect + Sync,
    {
        let source = record.source_ref();
        let existing = self.store.cash_logs().find_by_source(user, source).await?;
        let plan = plan_link(existing.as_ref(), record.cash_entry(), expected);
        if plan.missing_link {
            tracing::warn!(%source, "expected linked cash entry is missing");
        }

        match &plan.action {
            LinkAction::Create(draft) => {
                self.insert(user, draft.clone()).await?;
            }
            LinkAction::Update(_, draft) => {
                if let Some(log) = &existing {
                    draft.validate()?;
                    self.store.cash_logs().update(user, log.revise(draft.clone())).await?;
                }
            }
            LinkAction::Delete(id) => {
                self.store.cash_logs().delete(user, *id).await?;
            }
            LinkAction::Unchanged | LinkAction::Nothing => {}
        }
        tracing::debug!(%source, action = ?plan.action, "cash link synced");
        Ok(plan.action)
    }

    /// Remove the linked entry of a record that is about to be deleted.
    pub async fn unlink(&self, user: UserId, source: SourceRef, expected: bool) -> EngineResult<()> {
        match self.store.cash_logs().find_by_source(user, source).await? {
            Some(log) => {
                self.store.cash_logs().delete(user, log.id).await?;
                tracing::debug!(%source, "cash link removed");
            }
            None if expected => {
                tracing::warn!(%source, "expected linked cash entry is missing");
            }
            None => {}
        }
        Ok(())
    }

    /// Unlinked entry such as a collected due payment.
    pub async fn record_entry(&self, user: UserId, draft: CashEntryDraft) -> EngineResult<CashLog> {
        self.insert(user, draft).await
    }

    pub async fn add_manual_entry(&self, user: UserId, draft: CashEntryDraft) -> EngineResult<CashLog> {
        validate_manual(&draft)?;
        self.insert(user, draft).await
    }

    pub async fn update_manual_entry(&self, user: UserId, id: CashLogId, draft: CashEntryDraft) -> EngineResult<CashLog> {
        validate_manual(&draft)?;
        let existing = self.editable(user, id).await?;
        if existing.is_cash_count() {
            return Err(EngineError::Validation(
                "cash count entries are edited through the count sheet".into(),
            ));
        }
        Ok(self.store.cash_logs().update(user, existing.revise(draft)).await?)
    }

    pub async fn delete_entry(&self, user: UserId, id: CashLogId) -> EngineResult<()> {
        self.editable(user, id).await?;
        Ok(self.store.cash_logs().delete(user, id).await?)
    }

    /// Entries owned by a purchase/sale/expense/due follow their record.
    async fn editable(&self, user: UserId, id: CashLogId) -> EngineResult<CashLog> {
        let log = self
            .store
            .cash_logs()
            .get(user, id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("cash entry {id}")))?;
        if let Some(source) = log.source {
            return Err(EngineError::Validation(format!(
                "cash entry is managed by {source}; edit the {} instead",
                source.kind.as_str()
            )));
        }
        Ok(log)
    }

    pub async fn balance(&self, user: UserId) -> EngineResult<Decimal> {
        let logs = self.store.cash_logs().list(user).await?;
        Ok(cash_balance(&logs, None))
    }

    /// Save a physical count as the single entry that closes the gap.
    pub async fn record_cash_count(
        &self,
        user: UserId,
        notes: &BanknoteSet,
        counted: Denominations,
        date: NaiveDate,
    ) -> EngineResult<(CashCount, CashLog)> {
        let logs = self.store.cash_logs().list(user).await?;
        let (count, draft) = reconcile_count(notes, counted, cash_balance(&logs, None), date)?;
        let log = self.insert(user, draft).await?;
        tracing::info!(gap = %count.gap, physical_total = %count.physical_total, "cash count recorded");
        Ok((count, log))
    }

    /// Re-save an earlier count, comparing against the balance without its
    /// own previous adjustment.
    pub async fn edit_cash_count(
        &self,
        user: UserId,
        notes: &BanknoteSet,
        id: CashLogId,
        counted: Denominations,
        date: NaiveDate,
    ) -> EngineResult<(CashCount, CashLog)> {
        let existing = self.cash_count(user, id).await?;
        let logs = self.store.cash_logs().list(user).await?;
        let (count, draft) = reconcile_count(notes, counted, cash_balance(&logs, Some(id)), date)?;
        let log = self.store.cash_logs().update(user, existing.revise(draft)).await?;
        tracing::info!(gap = %count.gap, entry = %id, "cash count revised");
        Ok((count, log))
    }

    /// Full count sheet of a stored count: every configured note, missing = 0.
    pub async fn cash_count_sheet(&self, user: UserId, notes: &BanknoteSet, id: CashLogId) -> EngineResult<Vec<(u32, u32)>> {
        let log = self.cash_count(user, id).await?;
        let stored = log.denominations.unwrap_or_default();
        Ok(notes.sheet(&stored))
    }

    /// All saved counts, newest first.
    pub async fn cash_count_history(&self, user: UserId) -> EngineResult<Vec<CashLog>> {
        let logs = self.store.cash_logs().list(user).await?;
        Ok(logs.into_iter().filter(CashLog::is_cash_count).collect())
    }

    async fn cash_count(&self, user: UserId, id: CashLogId) -> EngineResult<CashLog> {
        let log = self
            .store
            .cash_logs()
            .get(user, id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("cash entry {id}")))?;
        if !log.is_cash_count() {
            return Err(DomainError::validation("entry is not a cash count").into());
        }
        Ok(log)
    }
}

fn validate_manual(draft: &CashEntryDraft) -> EngineResult<()> {
    if draft.source.is_some() || draft.denominations.is_some() {
        return Err(EngineError::Validation(
            "manual entries carry neither a source nor a count".into(),
        ));
    }
    draft.validate()?;
    if draft.kind != CashEntryKind::Opening && draft.amount <= Decimal::ZERO {
        return Err(EngineError::Validation("amount must be positive".into()));
    }
    Ok(())
}
