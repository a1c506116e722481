//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Plain records (parties, units of measure, product variants) implement this
/// directly; event-sourced records go through [`crate::AggregateRoot`].
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
