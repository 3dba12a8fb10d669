//! Lot boundaries: which purchase/sale rows belong to the open lot of a type.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use poultrybook_core::{DomainError, DomainResult, PoultryType};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

/// A stock-moving record that can be placed relative to a lot watermark.
pub trait LotRecord {
    fn poultry_type(&self) -> &PoultryType;

    /// Insert time, or the start of the business date when it was never set.
    fn effective_at(&self) -> DateTime<Utc>;
}

pub fn effective_timestamp(created_at: Option<DateTime<Utc>>, date: NaiveDate) -> DateTime<Utc> {
    created_at.unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc())
}

impl LotRecord for Purchase {
    fn poultry_type(&self) -> &PoultryType {
        &self.poultry_type
    }

    fn effective_at(&self) -> DateTime<Utc> {
        effective_timestamp(self.created_at, self.date)
    }
}

impl LotRecord for Sale {
    fn poultry_type(&self) -> &PoultryType {
        &self.poultry_type
    }

    fn effective_at(&self) -> DateTime<Utc> {
        effective_timestamp(self.created_at, self.date)
    }
}

/// Last lot reset per poultry type.
///
/// A type without an entry has never been reset; its lot starts at the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResetWatermarks {
    marks: BTreeMap<PoultryType, DateTime<Utc>>,
}

impl ResetWatermarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_reset(&self, ty: &PoultryType) -> DateTime<Utc> {
        self.marks
            .get(ty)
            .copied()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn get(&self, ty: &PoultryType) -> Option<DateTime<Utc>> {
        self.marks.get(ty).copied()
    }

    /// Move the watermark for `ty` to `at`. Never moves backwards.
    pub fn advance(&mut self, ty: PoultryType, at: DateTime<Utc>) {
        let mark = self.marks.entry(ty).or_insert(at);
        if at > *mark {
            *mark = at;
        }
    }

    /// Strictly after the watermark: a record stamped exactly at reset time
    /// belongs to the closed lot.
    pub fn is_current<R: LotRecord>(&self, record: &R) -> bool {
        record.effective_at() > self.last_reset(record.poultry_type())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PoultryType, &DateTime<Utc>)> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl FromIterator<(PoultryType, DateTime<Utc>)> for ResetWatermarks {
    fn from_iter<I: IntoIterator<Item = (PoultryType, DateTime<Utc>)>>(iter: I) -> Self {
        let mut marks = ResetWatermarks::new();
        for (ty, at) in iter {
            marks.advance(ty, at);
        }
        marks
    }
}

/// Keep only the records belonging to the open lot of their type.
pub fn current_lot_filter<R>(records: &[R], resets: &ResetWatermarks) -> Vec<R>
where
    R: LotRecord + Clone,
{
    records
        .iter()
        .filter(|r| resets.is_current(*r))
        .cloned()
        .collect()
}

/// Piece and money totals of one type's open lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LotTally {
    pub purchased_pieces: u64,
    pub sold_and_dead_pieces: u64,
    pub total_purchase: Decimal,
    pub total_sale: Decimal,
}

impl LotTally {
    /// Tally the rows of `ty`; rows of other types are ignored.
    ///
    /// Fails instead of wrapping when the lot's pieces or money overflow.
    pub fn of(ty: &PoultryType, purchases: &[Purchase], sales: &[Sale]) -> DomainResult<Self> {
        let overflow = || DomainError::invariant(format!("{ty} lot totals overflow"));
        let mut tally = LotTally::default();
        for p in purchases.iter().filter(|p| &p.poultry_type == ty) {
            tally.purchased_pieces = tally
                .purchased_pieces
                .checked_add(u64::from(p.pieces))
                .ok_or_else(overflow)?;
            let total = p
                .basis
                .checked_line_total(p.rate, p.pieces, p.kg)
                .ok_or_else(overflow)?;
            tally.total_purchase = tally.total_purchase.checked_add(total).ok_or_else(overflow)?;
        }
        for s in sales.iter().filter(|s| &s.poultry_type == ty) {
            tally.sold_and_dead_pieces = tally
                .sold_and_dead_pieces
                .checked_add(s.pieces_out())
                .ok_or_else(overflow)?;
            let total = s
                .basis
                .checked_line_total(s.rate, s.pieces, s.kg)
                .ok_or_else(overflow)?;
            tally.total_sale = tally.total_sale.checked_add(total).ok_or_else(overflow)?;
        }
        Ok(tally)
    }

    pub fn remaining_pieces(&self) -> i64 {
        self.purchased_pieces as i64 - self.sold_and_dead_pieces as i64
    }

    /// Something was bought and nothing is left.
    pub fn is_sold_out(&self) -> bool {
        self.purchased_pieces > 0 && self.remaining_pieces() <= 0
    }

    /// The lot moved money; an all-zero lot is not worth archiving.
    pub fn has_value(&self) -> bool {
        !(self.total_purchase.is_zero() && self.total_sale.is_zero())
    }

    pub fn is_empty(&self) -> bool {
        self.purchased_pieces == 0 && self.sold_and_dead_pieces == 0 && !self.has_value()
    }
}
