//! Closed-lot archive rows (append-only).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, Entity, LotArchiveId, PoultryType};

use crate::lot::LotTally;

/// Why a lot was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Stock reached zero through sales and mortality.
    SoldOut,
    /// An operator force-closed the lot.
    Manual,
}

/// Profit/loss summary of a closed lot.
///
/// Immutable: fields are private and `profit` is derived once at close time,
/// so `profit == total_sale - total_purchase` holds for every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLotArchive")]
pub struct LotArchive {
    id: LotArchiveId,
    poultry_type: PoultryType,
    total_purchase: Decimal,
    total_sale: Decimal,
    profit: Decimal,
    pieces_at_reset: Option<i64>,
    reason: CloseReason,
    closed_at: DateTime<Utc>,
}

impl LotArchive {
    /// Close a lot from its tally.
    ///
    /// A manual close records the unsold pieces written off with the lot.
    pub fn close(
        id: LotArchiveId,
        poultry_type: PoultryType,
        tally: &LotTally,
        reason: CloseReason,
        closed_at: DateTime<Utc>,
    ) -> Self {
        let pieces_at_reset = match reason {
            CloseReason::SoldOut => None,
            CloseReason::Manual => Some(tally.remaining_pieces()),
        };
        Self {
            id,
            poultry_type,
            total_purchase: tally.total_purchase,
            total_sale: tally.total_sale,
            profit: tally.total_sale - tally.total_purchase,
            pieces_at_reset,
            reason,
            closed_at,
        }
    }

    pub fn poultry_type(&self) -> &PoultryType {
        &self.poultry_type
    }

    pub fn total_purchase(&self) -> Decimal {
        self.total_purchase
    }

    pub fn total_sale(&self) -> Decimal {
        self.total_sale
    }

    pub fn profit(&self) -> Decimal {
        self.profit
    }

    pub fn pieces_at_reset(&self) -> Option<i64> {
        self.pieces_at_reset
    }

    pub fn reason(&self) -> CloseReason {
        self.reason
    }

    pub fn closed_at(&self) -> DateTime<Utc> {
        self.closed_at
    }
}

impl Entity for LotArchive {
    type Id = LotArchiveId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Deserialize)]
struct RawLotArchive {
    id: LotArchiveId,
    poultry_type: PoultryType,
    total_purchase: Decimal,
    total_sale: Decimal,
    profit: Decimal,
    pieces_at_reset: Option<i64>,
    reason: CloseReason,
    closed_at: DateTime<Utc>,
}

impl TryFrom<RawLotArchive> for LotArchive {
    type Error = DomainError;

    fn try_from(raw: RawLotArchive) -> Result<Self, Self::Error> {
        if raw.profit != raw.total_sale - raw.total_purchase {
            return Err(DomainError::invariant(format!(
                "lot archive {} profit does not equal sale minus purchase",
                raw.id
            )));
        }
        Ok(Self {
            id: raw.id,
            poultry_type: raw.poultry_type,
            total_purchase: raw.total_purchase,
            total_sale: raw.total_sale,
            profit: raw.profit,
            pieces_at_reset: raw.pieces_at_reset,
            reason: raw.reason,
            closed_at: raw.closed_at,
        })
    }
}
