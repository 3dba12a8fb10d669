//! Sales module: birds leaving stock, either sold or lost to mortality.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod sale;

pub use sale::{Sale, SaleDraft};
