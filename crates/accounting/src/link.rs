//! Keeping one linked cash entry per cash-moving record.
//!
//! The decision is pure: given the entry currently linked to a record (if
//! any) and the entry the record should have now, [`plan_link`] says what
//! the ledger must do. Applying the plan is left to the caller.

use rust_decimal::Decimal;

use poultrybook_core::CashLogId;
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

use crate::cash::{CashEntryDraft, CashEntryKind, CashLog, SourceRef};
use crate::due::DueRecord;
use crate::expense::Expense;

/// A record that moves money through the cash box.
pub trait CashEffect {
    fn source_ref(&self) -> SourceRef;

    /// The linked entry this record should have, or `None` when it has no
    /// cash effect (credit purchase, zero total).
    fn cash_entry(&self) -> Option<CashEntryDraft>;
}

fn positive(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

impl CashEffect for Purchase {
    fn source_ref(&self) -> SourceRef {
        SourceRef::purchase(self.id)
    }

    fn cash_entry(&self) -> Option<CashEntryDraft> {
        let total = self.total();
        (self.is_cash() && positive(total)).then(|| {
            CashEntryDraft::new(
                CashEntryKind::Withdraw,
                total,
                self.date,
                format!("Poultry purchase: {}", self.poultry_type),
            )
            .linked_to(self.source_ref())
        })
    }
}

impl CashEffect for Sale {
    fn source_ref(&self) -> SourceRef {
        SourceRef::sale(self.id)
    }

    // Every sale is cash income; `is_cash` is informational only.
    fn cash_entry(&self) -> Option<CashEntryDraft> {
        let total = self.total();
        positive(total).then(|| {
            CashEntryDraft::new(
                CashEntryKind::Add,
                total,
                self.date,
                format!("Sale income: {}", self.poultry_type),
            )
            .linked_to(self.source_ref())
        })
    }
}

impl CashEffect for Expense {
    fn source_ref(&self) -> SourceRef {
        SourceRef::expense(self.id)
    }

    fn cash_entry(&self) -> Option<CashEntryDraft> {
        positive(self.amount).then(|| {
            CashEntryDraft::new(
                CashEntryKind::Withdraw,
                self.amount,
                self.date,
                format!("Expense: {}", self.category),
            )
            .linked_to(self.source_ref())
        })
    }
}

impl CashEffect for DueRecord {
    fn source_ref(&self) -> SourceRef {
        SourceRef::due(self.id)
    }

    /// Goods handed over on credit count as cash out until collected.
    fn cash_entry(&self) -> Option<CashEntryDraft> {
        positive(self.amount).then(|| {
            CashEntryDraft::new(
                CashEntryKind::Withdraw,
                self.amount,
                self.date,
                format!("Due given: {}", self.customer_name),
            )
            .linked_to(self.source_ref())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    Create(CashEntryDraft),
    Update(CashLogId, CashEntryDraft),
    Delete(CashLogId),
    /// The linked entry already matches.
    Unchanged,
    /// No link exists and none is wanted.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    pub action: LinkAction,
    /// A link was expected (the record was a cash event before this
    /// change) but none was found. Tolerated, reported as a warning.
    pub missing_link: bool,
}

/// Decide how to bring the linked entry in line with `desired`.
///
/// `expected` is whether the record had a cash effect before the change;
/// it only feeds the `missing_link` flag.
pub fn plan_link(
    existing: Option<&CashLog>,
    desired: Option<CashEntryDraft>,
    expected: bool,
) -> LinkPlan {
    let missing_link = expected && existing.is_none();
    let action = match (existing, desired) {
        (None, None) => LinkAction::Nothing,
        (None, Some(draft)) => LinkAction::Create(draft),
        (Some(log), None) => LinkAction::Delete(log.id),
        (Some(log), Some(draft)) if draft.matches(log) => LinkAction::Unchanged,
        (Some(log), Some(draft)) => LinkAction::Update(log.id, draft),
    };
    LinkPlan { action, missing_link }
}
