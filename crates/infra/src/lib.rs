//! Infrastructure and orchestration for the poultry shop books.
//!
//! Storage boundary, identity, configuration, notifications, and the
//! engines that tie purchases, sales and dues to lots and the cash box.

pub mod bookkeeper;
pub mod cash_sync;
pub mod config;
pub mod error;
pub mod loader;
pub mod lot_engine;
pub mod notify;
pub mod session;
pub mod store;

mod integration_tests;

pub use bookkeeper::Bookkeeper;
pub use cash_sync::CashLedgerSync;
pub use config::BookkeepingConfig;
pub use error::{EngineError, EngineResult};
pub use loader::{Dashboard, DashboardView, LoadToken, load_dashboard};
pub use lot_engine::{LotEngine, LotEvaluation};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use session::Session;
pub use store::{InMemoryRecordStore, RecordStore, StoreError, StoreResult};
