//! Customer dues: goods handed over now, paid for later.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, DomainResult, DueId, Entity};

use crate::cash::{CashEntryDraft, CashEntryKind};

/// Credit extended to a customer.
///
/// Invariant: `0 <= paid <= amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRecord {
    pub id: DueId,
    pub customer_name: String,
    pub mobile: Option<String>,
    pub address: Option<String>,
    /// Total owed.
    pub amount: Decimal,
    /// Collected so far.
    pub paid: Decimal,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl DueRecord {
    pub fn remaining(&self) -> Decimal {
        self.amount - self.paid
    }

    pub fn is_settled(&self) -> bool {
        self.remaining() <= Decimal::ZERO
    }

    /// Collect part of the due. Returns the updated record.
    ///
    /// The collected amount must be positive and may not exceed what is
    /// still owed.
    pub fn receive_payment(&self, amount: Decimal) -> DomainResult<DueRecord> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if amount > self.remaining() {
            return Err(DomainError::validation(format!(
                "payment {amount} exceeds outstanding {}",
                self.remaining()
            )));
        }
        let mut updated = self.clone();
        updated.paid += amount;
        Ok(updated)
    }

    /// Cash entry for a collected payment (the increment, not the new total).
    pub fn payment_entry(&self, amount: Decimal, date: NaiveDate) -> CashEntryDraft {
        CashEntryDraft::new(
            CashEntryKind::Add,
            amount,
            date,
            format!("Due collected: {}", self.customer_name),
        )
    }

    pub fn apply_update(&self, update: DueUpdate) -> DomainResult<DueRecord> {
        let mut updated = self.clone();
        if let Some(name) = update.customer_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("customer name cannot be empty"));
            }
            updated.customer_name = name.trim().to_string();
        }
        if let Some(mobile) = update.mobile {
            updated.mobile = Some(mobile).filter(|m| !m.trim().is_empty());
        }
        if let Some(address) = update.address {
            updated.address = Some(address).filter(|a| !a.trim().is_empty());
        }
        if let Some(amount) = update.amount {
            if amount <= Decimal::ZERO {
                return Err(DomainError::validation("due amount must be positive"));
            }
            if amount < updated.paid {
                return Err(DomainError::invariant(format!(
                    "due amount {amount} is below the {} already collected",
                    updated.paid
                )));
            }
            updated.amount = amount;
        }
        if let Some(date) = update.date {
            updated.date = date;
        }
        Ok(updated)
    }
}

impl Entity for DueRecord {
    type Id = DueId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDraft {
    pub customer_name: String,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl DueDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("due amount must be positive"));
        }
        Ok(())
    }

    pub fn record(self, id: DueId, created_at: Option<DateTime<Utc>>) -> DueRecord {
        DueRecord {
            id,
            customer_name: self.customer_name.trim().to_string(),
            mobile: self.mobile.filter(|m| !m.trim().is_empty()),
            address: self.address.filter(|a| !a.trim().is_empty()),
            amount: self.amount,
            paid: Decimal::ZERO,
            date: self.date,
            created_at,
        }
    }
}

/// Partial edit of a due; `None` leaves the field unchanged.
///
/// `paid` is not editable here; it only moves through payments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DueUpdate {
    pub customer_name: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Σ(amount − paid) over all dues.
pub fn outstanding_total<'a, I>(dues: I) -> Decimal
where
    I: IntoIterator<Item = &'a DueRecord>,
{
    dues.into_iter().map(DueRecord::remaining).sum()
}
