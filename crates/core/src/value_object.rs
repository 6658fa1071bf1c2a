//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; to
/// "modify" one, build a new one. `Money` is the canonical example in this
/// workspace: two amounts of `10.00` are the same amount regardless of where
/// they came from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
