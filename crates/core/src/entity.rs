//! Entity trait: identity-bearing domain objects.

/// Marker + minimal interface for entities (compared by identity, not value).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
