use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, DomainResult, Entity, PoultryCatalog, PoultryType, PriceBasis, PurchaseId};

/// A batch of birds bought from a supplier.
///
/// `total` is derived from `rate`, `basis` and the quantities on every read,
/// so editing a single field can never leave a stale total behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub poultry_type: PoultryType,
    pub pieces: u32,
    pub kg: Decimal,
    pub rate: Decimal,
    pub basis: PriceBasis,
    /// Business date chosen by the operator.
    pub date: NaiveDate,
    /// Insert time; `None` only for rows imported without one.
    pub created_at: Option<DateTime<Utc>>,
    /// Bought on credit: no cash leaves the box.
    pub is_credit: bool,
}

impl Purchase {
    pub fn total(&self) -> Decimal {
        self.basis.line_total(self.rate, self.pieces, self.kg)
    }

    pub fn is_cash(&self) -> bool {
        !self.is_credit
    }

    /// Apply an edit, keeping identity and insert time.
    pub fn revise(&self, draft: PurchaseDraft) -> Purchase {
        draft.record(self.id, self.created_at)
    }
}

impl Entity for Purchase {
    type Id = PurchaseId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Operator input for a new or edited purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub poultry_type: PoultryType,
    pub pieces: u32,
    pub kg: Decimal,
    pub rate: Decimal,
    pub basis: PriceBasis,
    pub date: NaiveDate,
    pub is_credit: bool,
}

impl PurchaseDraft {
    pub fn validate(&self, catalog: &PoultryCatalog) -> DomainResult<()> {
        catalog.ensure_known(&self.poultry_type)?;
        if self.kg.is_sign_negative() {
            return Err(DomainError::validation("kg cannot be negative"));
        }
        if self.rate.is_sign_negative() {
            return Err(DomainError::validation("rate cannot be negative"));
        }
        if self
            .basis
            .checked_line_total(self.rate, self.pieces, self.kg)
            .is_none()
        {
            return Err(DomainError::validation("purchase total is too large"));
        }
        if self.pieces == 0 && self.kg.is_zero() {
            return Err(DomainError::validation("purchase must have pieces or weight"));
        }
        Ok(())
    }

    pub fn record(self, id: PurchaseId, created_at: Option<DateTime<Utc>>) -> Purchase {
        Purchase {
            id,
            poultry_type: self.poultry_type,
            pieces: self.pieces,
            kg: self.kg,
            rate: self.rate,
            basis: self.basis,
            date: self.date,
            created_at,
            is_credit: self.is_credit,
        }
    }
}
