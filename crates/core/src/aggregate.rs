//! Aggregate root trait for the allocation domain models.

/// Aggregate root marker + minimal interface.
///
/// An aggregate root is the only entry point for mutating the entities it owns.
/// Loading, saving and conflict detection are left to the surrounding service
/// layer; the aggregate only exposes the version it is at.
pub trait AggregateRoot {
    /// Aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Used by persistence layers as an optimistic concurrency token. Each
    /// aggregate decides which operations advance it.
    fn version(&self) -> u64;
}
