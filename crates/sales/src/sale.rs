use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, DomainResult, Entity, PoultryCatalog, PoultryType, PriceBasis, SaleId};

/// Birds sold to a customer, plus birds that died since the last sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub poultry_type: PoultryType,
    pub pieces: u32,
    pub kg: Decimal,
    pub rate: Decimal,
    pub basis: PriceBasis,
    /// Birds that left stock without being sold.
    pub mortality: u32,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    /// Informational only; every sale counts as cash in the ledger.
    pub is_cash: bool,
}

impl Sale {
    pub fn total(&self) -> Decimal {
        self.basis.line_total(self.rate, self.pieces, self.kg)
    }

    /// Pieces that leave stock with this row (sold + dead).
    pub fn pieces_out(&self) -> u64 {
        u64::from(self.pieces) + u64::from(self.mortality)
    }

    pub fn revise(&self, draft: SaleDraft) -> Sale {
        draft.record(self.id, self.created_at)
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Operator input for a new or edited sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub poultry_type: PoultryType,
    pub pieces: u32,
    pub kg: Decimal,
    pub rate: Decimal,
    pub basis: PriceBasis,
    pub mortality: u32,
    pub date: NaiveDate,
    pub is_cash: bool,
}

impl SaleDraft {
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
            return Err(DomainError::validation("sale total is too large"));
        }
        // A mortality-only row is allowed: it moves stock without money.
        if self.pieces == 0 && self.mortality == 0 && self.kg.is_zero() {
            return Err(DomainError::validation("sale must have pieces, weight or mortality"));
        }
        Ok(())
    }

    pub fn record(self, id: SaleId, created_at: Option<DateTime<Utc>>) -> Sale {
        Sale {
            id,
            poultry_type: self.poultry_type,
            pieces: self.pieces,
            kg: self.kg,
            rate: self.rate,
            basis: self.basis,
            mortality: self.mortality,
            date: self.date,
            created_at,
            is_cash: self.is_cash,
        }
    }
}
