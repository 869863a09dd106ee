//! Entities: records that are looked up by identity rather than by value.

/// Something stored and retrieved by its own identifier.
///
/// Both catalog services and booking records are entities; the in-memory
/// stores index them through this trait.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Identifier this entity is stored under.
    fn id(&self) -> &Self::Id;
}
