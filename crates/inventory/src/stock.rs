//! On-hand stock per poultry type.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{PoultryCatalog, PoultryType};
use poultrybook_purchasing::Purchase;
use poultrybook_sales::Sale;

/// Stock of one poultry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockLevel {
    /// Bought minus sold minus dead. Negative when sales outran recorded purchases.
    pub pieces: i64,
    pub kg: Decimal,
    pub dead: i64,
}

/// Stock for every catalog type plus any type seen in the records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    levels: BTreeMap<PoultryType, StockLevel>,
}

impl StockSnapshot {
    /// Stock of `ty`; zero for a type that was never traded.
    pub fn get(&self, ty: &PoultryType) -> StockLevel {
        self.levels.get(ty).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PoultryType, &StockLevel)> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Accumulate stock from purchases and sales.
///
/// Callers pass the current-lot lists (see [`crate::current_lot_filter`]) for
/// the live view. Every catalog type is present in the result even without
/// records. Rows of a type missing from the catalog are still counted so that
/// stock is never silently dropped.
pub fn compute_stock(catalog: &PoultryCatalog, purchases: &[Purchase], sales: &[Sale]) -> StockSnapshot {
    let mut levels: BTreeMap<PoultryType, StockLevel> = catalog
        .types()
        .iter()
        .map(|t| (t.clone(), StockLevel::default()))
        .collect();

    for p in purchases {
        let level = levels.entry(p.poultry_type.clone()).or_default();
        level.pieces += i64::from(p.pieces);
        level.kg += p.kg;
    }

    for s in sales {
        let level = levels.entry(s.poultry_type.clone()).or_default();
        level.pieces -= i64::from(s.pieces) + i64::from(s.mortality);
        level.kg -= s.kg;
        level.dead += i64::from(s.mortality);
    }

    StockSnapshot { levels }
}
