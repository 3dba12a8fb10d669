//! Shop expenses (always paid from the cash box).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, DomainResult, Entity, ExpenseId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn revise(&self, draft: ExpenseDraft) -> Expense {
        draft.record(self.id, self.created_at)
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("expense category cannot be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("expense amount must be positive"));
        }
        Ok(())
    }

    pub fn record(self, id: ExpenseId, created_at: Option<DateTime<Utc>>) -> Expense {
        Expense {
            id,
            category: self.category.trim().to_string(),
            amount: self.amount,
            note: self.note,
            date: self.date,
            created_at,
        }
    }
}
