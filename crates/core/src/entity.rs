//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities in this workspace get their identifier from the persistence
/// collaborator, so `id()` is `None` until the record has been saved.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the identifier, if one has been assigned.
    fn id(&self) -> Option<Self::Id>;
}

/// Two-tier identity comparison.
///
/// When both sides carry an identifier the identifiers decide. Otherwise the
/// caller-supplied structural comparison decides.
///
/// The relation is reflexive and symmetric but **not transitive** once
/// persisted and unpersisted records are mixed: an unsaved record can match
/// two saved records with different identifiers. Types built on it therefore
/// implement neither `Eq` nor `Hash`, and must not be used as map keys.
pub fn same_entity<E, F>(a: &E, b: &E, structural: F) -> bool
where
    E: Entity,
    F: FnOnce(&E, &E) -> bool,
{
    match (a.id(), b.id()) {
        (Some(x), Some(y)) => x == y,
        _ => structural(a, b),
    }
}
