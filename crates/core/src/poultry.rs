//! Poultry categories and the configured catalog.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A poultry category label (e.g. "Broiler").
///
/// Labels are free-form text drawn from a configured catalog; comparison is
/// exact after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoultryType(String);

impl PoultryType {
    pub fn new(label: impl Into<String>) -> DomainResult<Self> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("poultry type cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PoultryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PoultryType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fixed set of poultry categories the shop trades in.
///
/// Injected into the engine from configuration so that stock views can
/// default every known category to zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoultryCatalog {
    types: Vec<PoultryType>,
}

impl PoultryCatalog {
    /// Build a catalog from labels, dropping duplicates while keeping order.
    pub fn new<I, S>(labels: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types: Vec<PoultryType> = Vec::new();
        for label in labels {
            let ty = PoultryType::new(label)?;
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        Ok(Self { types })
    }

    pub fn types(&self) -> &[PoultryType] {
        &self.types
    }

    pub fn contains(&self, ty: &PoultryType) -> bool {
        self.types.contains(ty)
    }

    /// Reject categories that are not part of the catalog.
    pub fn ensure_known(&self, ty: &PoultryType) -> DomainResult<()> {
        if self.contains(ty) {
            Ok(())
        } else {
            Err(DomainError::validation(format!("unknown poultry type: {ty}")))
        }
    }
}
