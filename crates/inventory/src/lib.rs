//! Stock & lot module.
//!
//! Derives on-hand stock per poultry type from the append-only purchase/sale
//! history and models the resettable "lot" boundary on top of it. Everything
//! here is deterministic: the infrastructure layer loads records, calls these
//! functions, and persists the outcome.

pub mod archive;
pub mod lot;
pub mod stock;

pub use archive::{CloseReason, LotArchive};
pub use lot::{LotRecord, LotTally, ResetWatermarks, current_lot_filter, effective_timestamp};
pub use stock::{StockLevel, StockSnapshot, compute_stock};
