//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two order lines
/// with the same order id, SKU and quantity are the same line.
///
/// - **Value Object**: no identity (same values means equal)
/// - **Entity**: has identity (same id means the same entity)
///
/// To "modify" a value object, build a new one with the new values.
pub trait ValueObject: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug {}
