//! Accounting module: the cash box and what moves money in and out of it.
//!
//! The cash balance is never stored; it is the running sum of [`CashLog`]
//! entries. Purchases, sales, expenses and dues each own at most one linked
//! entry, identified by a structured [`SourceRef`].
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod cash;
pub mod denomination;
pub mod due;
pub mod expense;
pub mod link;

pub use cash::{CashEntryDraft, CashEntryKind, CashLog, SourceKind, SourceRef, cash_balance};
pub use denomination::{BanknoteSet, CashCount, Denominations, reconcile_count};
pub use due::{DueDraft, DueRecord, DueUpdate, outstanding_total};
pub use expense::{Expense, ExpenseDraft};
pub use link::{CashEffect, LinkAction, LinkPlan, plan_link};
