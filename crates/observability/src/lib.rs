//! Tracing and logging setup shared by every binary embedding the books.
//!
//! The engine crates only emit `tracing` events. Nothing is printed until the
//! embedding process calls [`init`] once at startup; the infra test harness
//! does so as well.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, output format).
pub mod tracing;
