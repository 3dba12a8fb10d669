//! Physical cash counts by banknote, and reconciling them with the ledger.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use poultrybook_core::{DomainError, DomainResult};

use crate::cash::{CashEntryDraft, CashEntryKind};

/// Banknote value → number of notes counted. Zero counts are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denominations(BTreeMap<u32, u32>);

impl Denominations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut d = Self::new();
        for (note, count) in counts {
            d.set(note, count);
        }
        d
    }

    pub fn set(&mut self, note: u32, count: u32) {
        if count == 0 {
            self.0.remove(&note);
        } else {
            self.0.insert(note, count);
        }
    }

    pub fn count(&self, note: u32) -> u32 {
        self.0.get(&note).copied().unwrap_or(0)
    }

    pub fn total(&self) -> Decimal {
        self.0
            .iter()
            .map(|(note, count)| Decimal::from(*note) * Decimal::from(*count))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(n, c)| (*n, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The banknote values the count sheet offers, largest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanknoteSet {
    notes: Vec<u32>,
}

impl BanknoteSet {
    pub fn new<I: IntoIterator<Item = u32>>(notes: I) -> DomainResult<Self> {
        let mut notes: Vec<u32> = notes.into_iter().collect();
        if notes.iter().any(|n| *n == 0) {
            return Err(DomainError::validation("banknote value must be positive"));
        }
        notes.sort_unstable_by(|a, b| b.cmp(a));
        notes.dedup();
        if notes.is_empty() {
            return Err(DomainError::validation("at least one banknote value is required"));
        }
        Ok(Self { notes })
    }

    pub fn notes(&self) -> &[u32] {
        &self.notes
    }

    pub fn ensure_known(&self, counted: &Denominations) -> DomainResult<()> {
        match counted.iter().find(|(note, _)| !self.notes.contains(note)) {
            Some((note, _)) => Err(DomainError::validation(format!("unknown banknote value: {note}"))),
            None => Ok(()),
        }
    }

    /// Full count sheet for editing: every configured note, missing ones at zero.
    pub fn sheet(&self, stored: &Denominations) -> Vec<(u32, u32)> {
        self.notes.iter().map(|n| (*n, stored.count(*n))).collect()
    }
}

/// Result of comparing counted cash with the ledger balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashCount {
    pub system_balance: Decimal,
    pub physical_total: Decimal,
    /// `physical_total - system_balance`; positive is a surplus.
    pub gap: Decimal,
}

impl CashCount {
    pub fn new(system_balance: Decimal, counted: &Denominations) -> Self {
        let physical_total = counted.total();
        Self {
            system_balance,
            physical_total,
            gap: physical_total - system_balance,
        }
    }

    /// Single ledger entry that brings the balance to the counted total.
    pub fn adjustment(&self, counted: Denominations, date: NaiveDate) -> CashEntryDraft {
        let (kind, note) = if self.gap.is_zero() {
            (CashEntryKind::Add, "Cash count matched".to_string())
        } else if self.gap.is_sign_positive() {
            (CashEntryKind::Add, format!("Cash adjustment (surplus {})", self.gap))
        } else {
            (CashEntryKind::Withdraw, format!("Cash adjustment (shortage {})", self.gap.abs()))
        };
        let mut draft = CashEntryDraft::new(kind, self.gap.abs(), date, note);
        draft.denominations = Some(counted);
        draft
    }
}

/// Validate a count and produce the adjustment that makes the ledger match it.
pub fn reconcile_count(
    notes: &BanknoteSet,
    counted: Denominations,
    system_balance: Decimal,
    date: NaiveDate,
) -> DomainResult<(CashCount, CashEntryDraft)> {
    notes.ensure_known(&counted)?;
    let count = CashCount::new(system_balance, &counted);
    if count.physical_total <= Decimal::ZERO {
        return Err(DomainError::validation("enter the number of notes counted"));
    }
    let draft = count.adjustment(counted, date);
    Ok((count, draft))
}
