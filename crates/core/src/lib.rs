//! `poultrybook-core`: shared building blocks for the bookkeeping domain.
//!
//! Pure domain primitives only: identifiers, the error model, the poultry
//! catalog and the clock port. No storage or IO concerns live here.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod poultry;
pub mod pricing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CashLogId, DueId, ExpenseId, LotArchiveId, PurchaseId, SaleId, UserId};
pub use poultry::{PoultryCatalog, PoultryType};
pub use pricing::PriceBasis;
