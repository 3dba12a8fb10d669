//! Dashboard loading.
//!
//! The seven collections have no dependency on each other, so they are
//! fetched concurrently; the lot filter and stock are derived once all of
//! them are in. Loads are never cancelled, so [`DashboardView`] drops any
//! result that resolves after a newer one was already applied.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;

use poultrybook_accounting::{CashLog, DueRecord, Expense, cash_balance, outstanding_total};
use poultrybook_core::{PoultryCatalog, UserId};
use poultrybook_inventory::{LotArchive, ResetWatermarks, StockSnapshot, compute_stock, current_lot_filter};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

use crate::error::EngineResult;
use crate::store::RecordStore;

/// Everything the shop screens show, computed from one consistent fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// Full history, date descending.
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub dues: Vec<DueRecord>,
    pub cash_logs: Vec<CashLog>,
    pub lot_history: Vec<LotArchive>,
    pub resets: ResetWatermarks,
    /// Open-lot rows only.
    pub current_purchases: Vec<Purchase>,
    pub current_sales: Vec<Sale>,
    /// Stock of the open lots.
    pub stock: StockSnapshot,
    pub cash_balance: Decimal,
    pub outstanding_dues: Decimal,
}

pub async fn load_dashboard(
    store: &dyn RecordStore,
    user: UserId,
    catalog: &PoultryCatalog,
) -> EngineResult<Dashboard> {
    let (purchases, sales, expenses, dues, cash_logs, lot_history, resets) = tokio::try_join!(
        store.purchases().list(user),
        store.sales().list(user),
        store.expenses().list(user),
        store.dues().list(user),
        store.cash_logs().list(user),
        store.archives().list(user),
        store.resets().list(user),
    )?;

    let current_purchases = current_lot_filter(&purchases, &resets);
    let current_sales = current_lot_filter(&sales, &resets);
    let stock = compute_stock(catalog, &current_purchases, &current_sales);
    let balance = cash_balance(&cash_logs, None);
    let outstanding = outstanding_total(&dues);

    Ok(Dashboard {
        purchases,
        sales,
        expenses,
        dues,
        cash_logs,
        lot_history,
        resets,
        current_purchases,
        current_sales,
        stock,
        cash_balance: balance,
        outstanding_dues: outstanding,
    })
}

/// Sequence token handed out when a load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

/// Shared view state guarded against out-of-order load completion.
#[derive(Debug, Default)]
pub struct DashboardView {
    issued: AtomicU64,
    applied: Mutex<(u64, Option<Dashboard>)>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadToken {
        LoadToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply a loaded dashboard unless a newer load was applied first.
    pub fn apply(&self, token: LoadToken, dashboard: Dashboard) -> bool {
        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if token.0 <= applied.0 {
            tracing::debug!(token = token.0, applied = applied.0, "stale dashboard load dropped");
            return false;
        }
        *applied = (token.0, Some(dashboard));
        true
    }

    pub fn current(&self) -> Option<Dashboard> {
        match self.applied.lock() {
            Ok(guard) => guard.1.clone(),
            Err(poisoned) => poisoned.into_inner().1.clone(),
        }
    }
}
