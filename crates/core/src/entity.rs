//! Entity trait: identity + continuity across edits.

/// Entity marker + minimal interface.
///
/// Every persisted bookkeeping record (purchase, sale, expense, due, cash log,
/// lot archive) is an entity: edits keep the identifier stable.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy
        + Eq
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + Send
        + Sync
        + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
