//! Application facade: every user action of the shop goes through here.
//!
//! Each mutating call resolves the signed-in user, validates the input
//! before touching the store, writes the record, keeps the linked cash
//! entry in step and re-runs the lot check for the affected type. The
//! outcome is reported through the injected [`Notifier`].

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use poultrybook_accounting::{
    BanknoteSet, CashCount, CashEffect, CashEntryDraft, CashLog, Denominations, DueDraft, DueRecord,
    DueUpdate, Expense, ExpenseDraft, outstanding_total,
};
use poultrybook_core::{
    CashLogId, Clock, DueId, ExpenseId, PoultryCatalog, PoultryType, PurchaseId, SaleId, UserId,
};
use poultrybook_inventory::LotArchive;
use poultrybook_purchasing::{Purchase, PurchaseDraft};
use poultrybook_sales::{Sale, SaleDraft};

use crate::cash_sync::CashLedgerSync;
use crate::config::BookkeepingConfig;
use crate::error::{EngineError, EngineResult};
use crate::loader::{Dashboard, DashboardView, load_dashboard};
use crate::lot_engine::LotEngine;
use crate::notify::{Notification, Notifier};
use crate::session::Session;
use crate::store::RecordStore;

pub struct Bookkeeper<S> {
    store: S,
    session: Session,
    catalog: PoultryCatalog,
    banknotes: BanknoteSet,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<S: RecordStore> Bookkeeper<S> {
    pub fn new(
        store: S,
        session: Session,
        config: &BookkeepingConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> EngineResult<Self> {
        Ok(Self {
            store,
            session,
            catalog: config.catalog()?,
            banknotes: config.banknote_set()?,
            clock,
            notifier,
        })
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Switch identity (sign in / sign out).
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    pub fn catalog(&self) -> &PoultryCatalog {
        &self.catalog
    }

    pub fn banknotes(&self) -> &BanknoteSet {
        &self.banknotes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn user(&self) -> EngineResult<UserId> {
        self.session.require_user()
    }

    fn lots(&self) -> LotEngine<'_> {
        LotEngine::new(&self.store, self.clock.as_ref(), self.notifier.as_ref())
    }

    fn cash(&self) -> CashLedgerSync<'_> {
        CashLedgerSync::new(&self.store, self.clock.as_ref())
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    fn report<T>(&self, result: EngineResult<T>, success: &str) -> EngineResult<T> {
        match &result {
            Ok(_) => self.notifier.notify(Notification::success(success)),
            Err(err) => {
                tracing::warn!(error = %err, "bookkeeping action failed");
                self.notifier.notify(Notification::error(err.to_string()));
            }
        }
        result
    }

    /// Lot check for the type after an edit, and for the previous type too
    /// when the edit moved the record to another type.
    async fn re_evaluate(&self, user: UserId, before: &PoultryType, after: &PoultryType) -> EngineResult<()> {
        self.lots().on_mutation(user, after).await?;
        if before != after {
            self.lots().on_mutation(user, before).await?;
        }
        Ok(())
    }

    // Purchases

    pub async fn add_purchase(&self, draft: PurchaseDraft) -> EngineResult<Purchase> {
        let result = async {
            let user = self.user()?;
            draft.validate(&self.catalog)?;
            let record = draft.record(PurchaseId::new(), Some(self.clock.now()));
            let purchase = self.store.purchases().insert(user, record).await?;
            self.cash().sync_link(user, &purchase, false).await?;
            self.lots().on_mutation(user, &purchase.poultry_type).await?;
            Ok::<_, EngineError>(purchase)
        }
        .await;
        self.report(result, "Purchase saved")
    }

    pub async fn update_purchase(&self, id: PurchaseId, draft: PurchaseDraft) -> EngineResult<Purchase> {
        let result = async {
            let user = self.user()?;
            draft.validate(&self.catalog)?;
            let original = self
                .store
                .purchases()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("purchase {id}")))?;
            let purchase = self.store.purchases().update(user, original.revise(draft)).await?;
            self.cash()
                .sync_link(user, &purchase, original.cash_entry().is_some())
                .await?;
            self.re_evaluate(user, &original.poultry_type, &purchase.poultry_type).await?;
            Ok::<_, EngineError>(purchase)
        }
        .await;
        self.report(result, "Purchase updated")
    }

    pub async fn delete_purchase(&self, id: PurchaseId) -> EngineResult<()> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .purchases()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("purchase {id}")))?;
            self.cash()
                .unlink(user, original.source_ref(), original.cash_entry().is_some())
                .await?;
            self.store.purchases().delete(user, id).await?;
            self.lots().on_mutation(user, &original.poultry_type).await?;
            Ok::<_, EngineError>(())
        }
        .await;
        self.report(result, "Purchase deleted")
    }

    pub async fn purchase(&self, id: PurchaseId) -> EngineResult<Option<Purchase>> {
        Ok(self.store.purchases().get(self.user()?, id).await?)
    }

    pub async fn purchases(&self) -> EngineResult<Vec<Purchase>> {
        Ok(self.store.purchases().list(self.user()?).await?)
    }

    // Sales

    pub async fn add_sale(&self, draft: SaleDraft) -> EngineResult<Sale> {
        let result = async {
            let user = self.user()?;
            draft.validate(&self.catalog)?;
            let record = draft.record(SaleId::new(), Some(self.clock.now()));
            let sale = self.store.sales().insert(user, record).await?;
            self.cash().sync_link(user, &sale, false).await?;
            self.lots().on_mutation(user, &sale.poultry_type).await?;
            Ok::<_, EngineError>(sale)
        }
        .await;
        self.report(result, "Sale saved")
    }

    pub async fn update_sale(&self, id: SaleId, draft: SaleDraft) -> EngineResult<Sale> {
        let result = async {
            let user = self.user()?;
            draft.validate(&self.catalog)?;
            let original = self
                .store
                .sales()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("sale {id}")))?;
            let sale = self.store.sales().update(user, original.revise(draft)).await?;
            self.cash()
                .sync_link(user, &sale, original.cash_entry().is_some())
                .await?;
            self.re_evaluate(user, &original.poultry_type, &sale.poultry_type).await?;
            Ok::<_, EngineError>(sale)
        }
        .await;
        self.report(result, "Sale updated")
    }

    pub async fn delete_sale(&self, id: SaleId) -> EngineResult<()> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .sales()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("sale {id}")))?;
            self.cash()
                .unlink(user, original.source_ref(), original.cash_entry().is_some())
                .await?;
            self.store.sales().delete(user, id).await?;
            self.lots().on_mutation(user, &original.poultry_type).await?;
            Ok::<_, EngineError>(())
        }
        .await;
        self.report(result, "Sale deleted")
    }

    pub async fn sale(&self, id: SaleId) -> EngineResult<Option<Sale>> {
        Ok(self.store.sales().get(self.user()?, id).await?)
    }

    pub async fn sales(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.store.sales().list(self.user()?).await?)
    }

    // Expenses

    pub async fn add_expense(&self, draft: ExpenseDraft) -> EngineResult<Expense> {
        let result = async {
            let user = self.user()?;
            draft.validate()?;
            let record = draft.record(ExpenseId::new(), Some(self.clock.now()));
            let expense = self.store.expenses().insert(user, record).await?;
            self.cash().sync_link(user, &expense, false).await?;
            Ok::<_, EngineError>(expense)
        }
        .await;
        self.report(result, "Expense saved")
    }

    pub async fn update_expense(&self, id: ExpenseId, draft: ExpenseDraft) -> EngineResult<Expense> {
        let result = async {
            let user = self.user()?;
            draft.validate()?;
            let original = self
                .store
                .expenses()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("expense {id}")))?;
            let expense = self.store.expenses().update(user, original.revise(draft)).await?;
            self.cash().sync_link(user, &expense, true).await?;
            Ok::<_, EngineError>(expense)
        }
        .await;
        self.report(result, "Expense updated")
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> EngineResult<()> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .expenses()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("expense {id}")))?;
            self.cash().unlink(user, original.source_ref(), true).await?;
            self.store.expenses().delete(user, id).await?;
            Ok::<_, EngineError>(())
        }
        .await;
        self.report(result, "Expense deleted")
    }

    pub async fn expense(&self, id: ExpenseId) -> EngineResult<Option<Expense>> {
        Ok(self.store.expenses().get(self.user()?, id).await?)
    }

    pub async fn expenses(&self) -> EngineResult<Vec<Expense>> {
        Ok(self.store.expenses().list(self.user()?).await?)
    }

    // Dues

    pub async fn add_due(&self, draft: DueDraft) -> EngineResult<DueRecord> {
        let result = async {
            let user = self.user()?;
            draft.validate()?;
            let record = draft.record(DueId::new(), Some(self.clock.now()));
            let due = self.store.dues().insert(user, record).await?;
            self.cash().sync_link(user, &due, false).await?;
            Ok::<_, EngineError>(due)
        }
        .await;
        self.report(result, "Due recorded")
    }

    pub async fn update_due(&self, id: DueId, update: DueUpdate) -> EngineResult<DueRecord> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .dues()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("due {id}")))?;
            let due = self.store.dues().update(user, original.apply_update(update)?).await?;
            self.cash().sync_link(user, &due, true).await?;
            Ok::<_, EngineError>(due)
        }
        .await;
        self.report(result, "Due updated")
    }

    /// Remove a due and its creation entry. Collected payments stay in the
    /// cash log: that money was physically received.
    pub async fn delete_due(&self, id: DueId) -> EngineResult<()> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .dues()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("due {id}")))?;
            self.cash().unlink(user, original.source_ref(), true).await?;
            self.store.dues().delete(user, id).await?;
            Ok::<_, EngineError>(())
        }
        .await;
        self.report(result, "Due deleted")
    }

    /// Collect part of a due; the cash log receives exactly the increment.
    pub async fn receive_due_payment(&self, id: DueId, amount: Decimal) -> EngineResult<DueRecord> {
        let result = async {
            let user = self.user()?;
            let original = self
                .store
                .dues()
                .get(user, id)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("due {id}")))?;
            let paid = original.receive_payment(amount)?;
            let due = self.store.dues().update(user, paid).await?;
            self.cash()
                .record_entry(user, due.payment_entry(amount, self.today()))
                .await?;
            Ok::<_, EngineError>(due)
        }
        .await;
        self.report(result, "Payment received")
    }

    pub async fn due(&self, id: DueId) -> EngineResult<Option<DueRecord>> {
        Ok(self.store.dues().get(self.user()?, id).await?)
    }

    pub async fn dues(&self) -> EngineResult<Vec<DueRecord>> {
        Ok(self.store.dues().list(self.user()?).await?)
    }

    pub async fn outstanding_dues(&self) -> EngineResult<Decimal> {
        let dues = self.dues().await?;
        Ok(outstanding_total(&dues))
    }

    // Cash box

    pub async fn cash_logs(&self) -> EngineResult<Vec<CashLog>> {
        Ok(self.store.cash_logs().list(self.user()?).await?)
    }

    pub async fn cash_balance(&self) -> EngineResult<Decimal> {
        self.cash().balance(self.user()?).await
    }

    pub async fn add_cash_entry(&self, draft: CashEntryDraft) -> EngineResult<CashLog> {
        let result = async { self.cash().add_manual_entry(self.user()?, draft).await }.await;
        self.report(result, "Cash entry saved")
    }

    pub async fn update_cash_entry(&self, id: CashLogId, draft: CashEntryDraft) -> EngineResult<CashLog> {
        let result = async { self.cash().update_manual_entry(self.user()?, id, draft).await }.await;
        self.report(result, "Cash entry updated")
    }

    pub async fn delete_cash_entry(&self, id: CashLogId) -> EngineResult<()> {
        let result = async { self.cash().delete_entry(self.user()?, id).await }.await;
        self.report(result, "Cash entry deleted")
    }

    pub async fn record_cash_count(&self, counted: Denominations, date: NaiveDate) -> EngineResult<(CashCount, CashLog)> {
        let result = async {
            self.cash()
                .record_cash_count(self.user()?, &self.banknotes, counted, date)
                .await
        }
        .await;
        self.report(result, "Cash count saved")
    }

    pub async fn edit_cash_count(
        &self,
        id: CashLogId,
        counted: Denominations,
        date: NaiveDate,
    ) -> EngineResult<(CashCount, CashLog)> {
        let result = async {
            self.cash()
                .edit_cash_count(self.user()?, &self.banknotes, id, counted, date)
                .await
        }
        .await;
        self.report(result, "Cash count updated")
    }

    pub async fn cash_count_sheet(&self, id: CashLogId) -> EngineResult<Vec<(u32, u32)>> {
        self.cash().cash_count_sheet(self.user()?, &self.banknotes, id).await
    }

    pub async fn cash_count_history(&self) -> EngineResult<Vec<CashLog>> {
        self.cash().cash_count_history(self.user()?).await
    }

    // Lots

    /// Force-close the open lot of `poultry_type`.
    pub async fn reset_lot(&self, poultry_type: &PoultryType) -> EngineResult<Option<LotArchive>> {
        let result = async {
            let user = self.user()?;
            self.catalog.ensure_known(poultry_type)?;
            self.lots().reset_lot(user, poultry_type).await
        }
        .await;
        self.report(result, &format!("{poultry_type} lot reset"))
    }

    pub async fn lot_history(&self) -> EngineResult<Vec<LotArchive>> {
        Ok(self.store.archives().list(self.user()?).await?)
    }

    // Loading

    pub async fn dashboard(&self) -> EngineResult<Dashboard> {
        load_dashboard(&self.store, self.user()?, &self.catalog).await
    }

    /// Load and apply to `view`; `Ok(false)` when a newer load won the race.
    pub async fn refresh(&self, view: &DashboardView) -> EngineResult<bool> {
        let token = view.begin();
        let dashboard = self.dashboard().await?;
        Ok(view.apply(token, dashboard))
    }
}
