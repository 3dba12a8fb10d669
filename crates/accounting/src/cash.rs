//! Cash-box ledger entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use poultrybook_core::{CashLogId, DomainError, DomainResult, DueId, Entity, ExpenseId, PurchaseId, SaleId};

use crate::denomination::Denominations;

/// Direction of a cash entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashEntryKind {
    /// Starting float put into the box.
    Opening,
    Add,
    Withdraw,
}

impl CashEntryKind {
    pub fn sign(self) -> Decimal {
        match self {
            CashEntryKind::Opening | CashEntryKind::Add => Decimal::ONE,
            CashEntryKind::Withdraw => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Kind of record a cash entry was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Purchase,
    Sale,
    Expense,
    Due,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Purchase => "purchase",
            SourceKind::Sale => "sale",
            SourceKind::Expense => "expense",
            SourceKind::Due => "due",
        }
    }
}

/// Structured link from a cash entry to the record that produced it.
///
/// Matched by equality, never by searching free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: Uuid,
}

impl SourceRef {
    pub fn purchase(id: PurchaseId) -> Self {
        Self { kind: SourceKind::Purchase, id: id.into() }
    }

    pub fn sale(id: SaleId) -> Self {
        Self { kind: SourceKind::Sale, id: id.into() }
    }

    pub fn expense(id: ExpenseId) -> Self {
        Self { kind: SourceKind::Expense, id: id.into() }
    }

    pub fn due(id: DueId) -> Self {
        Self { kind: SourceKind::Due, id: id.into() }
    }
}

impl core::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// One movement of the physical cash box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLog {
    pub id: CashLogId,
    pub kind: CashEntryKind,
    /// Always non-negative; direction comes from `kind`.
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub note: String,
    pub source: Option<SourceRef>,
    /// Present only on entries written by a physical cash count.
    pub denominations: Option<Denominations>,
}

impl CashLog {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.sign() * self.amount
    }

    pub fn is_cash_count(&self) -> bool {
        self.denominations.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn revise(&self, draft: CashEntryDraft) -> CashLog {
        draft.record(self.id, self.created_at)
    }
}

impl Entity for CashLog {
    type Id = CashLogId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Content of a cash entry before it gets an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntryDraft {
    pub kind: CashEntryKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: String,
    pub source: Option<SourceRef>,
    pub denominations: Option<Denominations>,
}

impl CashEntryDraft {
    pub fn new(kind: CashEntryKind, amount: Decimal, date: NaiveDate, note: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            date,
            note: note.into(),
            source: None,
            denominations: None,
        }
    }

    pub fn linked_to(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(DomainError::validation("cash amount cannot be negative"));
        }
        Ok(())
    }

    pub fn record(self, id: CashLogId, created_at: DateTime<Utc>) -> CashLog {
        CashLog {
            id,
            kind: self.kind,
            amount: self.amount,
            date: self.date,
            created_at,
            note: self.note,
            source: self.source,
            denominations: self.denominations,
        }
    }

    /// True when `log` already carries exactly this content.
    pub fn matches(&self, log: &CashLog) -> bool {
        self.kind == log.kind
            && self.amount == log.amount
            && self.date == log.date
            && self.note == log.note
            && self.source == log.source
            && self.denominations == log.denominations
    }
}

/// Running cash-box balance, optionally leaving one entry out.
///
/// Leaving an entry out lets a cash count being edited be compared against
/// the balance without its own earlier adjustment.
pub fn cash_balance<'a, I>(logs: I, excluding: Option<CashLogId>) -> Decimal
where
    I: IntoIterator<Item = &'a CashLog>,
{
    logs.into_iter()
        .filter(|log| Some(log.id) != excluding)
        .map(CashLog::signed_amount)
        .sum()
}
