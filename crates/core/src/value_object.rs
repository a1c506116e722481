//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity: two currencies with the same code and
/// precision are the same currency. They are immutable; "changing" one means
/// building a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
