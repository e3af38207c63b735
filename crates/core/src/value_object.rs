//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined
//! entirely by their attribute values. Two value objects with the same values are
//! considered equal.

/// Marker trait for value objects.
///
/// Value objects are domain objects that are **immutable** and **compared by
/// value**. They represent concepts where identity doesn't matter - only the
/// values matter.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (two value objects with same values are equal)
/// - **Entity**: Has identity (two entities with same ID are the same entity)
///
/// Example:
/// - [`crate::Money`] is a value object: 3.75 equals 3.75 wherever it appears
/// - An inventory item is an entity: two items may both hold 50 kg of flour
///   and still be different items
///
/// ## Immutability
///
/// Value objects should be **immutable** - once created, they don't change. To
/// "modify" a value object, create a new one with the new values. A BOM line's
/// cost snapshot works this way: re-pricing replaces the line, it never edits
/// the old amount in place.
///
/// ## Design Constraints
///
/// The trait requires:
/// - **Clone**: Value objects should be cheap to copy (they're values, not references)
/// - **PartialEq**: Value objects are compared by their attribute values
/// - **Debug**: Value objects should be debuggable (helpful for logging, testing)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
