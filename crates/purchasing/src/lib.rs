//! Purchasing module: birds bought into stock.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod purchase;

pub use purchase::{Purchase, PurchaseDraft};
