//! How a trade line is priced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit the `rate` of a purchase or sale applies to.
///
/// Birds are traded either per head or by live weight; the line total is
/// always derived from the basis, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    PerPiece,
    #[default]
    PerKg,
}

impl PriceBasis {
    pub fn line_total(self, rate: Decimal, pieces: u32, kg: Decimal) -> Decimal {
        match self {
            PriceBasis::PerPiece => rate * Decimal::from(pieces),
            PriceBasis::PerKg => rate * kg,
        }
    }

    /// `None` when the product does not fit in a `Decimal`.
    pub fn checked_line_total(self, rate: Decimal, pieces: u32, kg: Decimal) -> Option<Decimal> {
        match self {
            PriceBasis::PerPiece => rate.checked_mul(Decimal::from(pieces)),
            PriceBasis::PerKg => rate.checked_mul(kg),
        }
    }
}
