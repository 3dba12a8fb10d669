//! Bookkeeping configuration.
//!
//! The poultry catalog and the banknote set are injected rather than
//! hard-coded. Both can be overridden from the environment:
//!
//! - `POULTRY_TYPES`: comma-separated labels, e.g. `Broiler,Layer`
//! - `CASH_NOTES`: comma-separated note values, e.g. `1000,500,100`
//!
//! A malformed variable is ignored with a warning and the default is used.

use serde::Deserialize;

use poultrybook_accounting::BanknoteSet;
use poultrybook_core::{DomainResult, PoultryCatalog};

pub const POULTRY_TYPES_VAR: &str = "POULTRY_TYPES";
pub const CASH_NOTES_VAR: &str = "CASH_NOTES";

const DEFAULT_POULTRY_TYPES: [&str; 5] = ["Broiler", "Layer", "Sonali", "Duck", "Deshi"];
const DEFAULT_BANKNOTES: [u32; 10] = [1000, 500, 200, 100, 50, 20, 10, 5, 2, 1];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookkeepingConfig {
    pub poultry_types: Vec<String>,
    pub banknotes: Vec<u32>,
}

impl Default for BookkeepingConfig {
    fn default() -> Self {
        Self {
            poultry_types: DEFAULT_POULTRY_TYPES.iter().map(|s| s.to_string()).collect(),
            banknotes: DEFAULT_BANKNOTES.to_vec(),
        }
    }
}

impl BookkeepingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(POULTRY_TYPES_VAR).ok().as_deref(),
            std::env::var(CASH_NOTES_VAR).ok().as_deref(),
        )
    }

    /// Build from raw variable values (`None` = unset).
    pub fn from_vars(poultry_types: Option<&str>, banknotes: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = poultry_types {
            match parse_labels(raw) {
                Some(types) => config.poultry_types = types,
                None => tracing::warn!(
                    var = POULTRY_TYPES_VAR,
                    value = raw,
                    "no usable poultry types, falling back to defaults"
                ),
            }
        }

        if let Some(raw) = banknotes {
            match parse_notes(raw) {
                Some(notes) => config.banknotes = notes,
                None => tracing::warn!(
                    var = CASH_NOTES_VAR,
                    value = raw,
                    "malformed banknote list, falling back to defaults"
                ),
            }
        }

        config
    }

    pub fn catalog(&self) -> DomainResult<PoultryCatalog> {
        PoultryCatalog::new(self.poultry_types.iter().cloned())
    }

    pub fn banknote_set(&self) -> DomainResult<BanknoteSet> {
        BanknoteSet::new(self.banknotes.iter().copied())
    }
}

fn parse_labels(raw: &str) -> Option<Vec<String>> {
    let labels: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!labels.is_empty()).then_some(labels)
}

fn parse_notes(raw: &str) -> Option<Vec<u32>> {
    let notes = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().ok().filter(|n| *n > 0))
        .collect::<Option<Vec<u32>>>()?;
    (!notes.is_empty()).then_some(notes)
}
