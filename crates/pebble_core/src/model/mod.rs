//! Habit-tracking domain model.
//!
//! # Responsibility
//! - Define the aggregates (category, habit, instance, collection) and the
//!   value types they are built from.
//! - Keep recurrence shape validation inside the model.
//!
//! # Invariants
//! - An aggregate is transient while `id` is `None` and persisted once the
//!   repository assigns an id; there is no other lifecycle state.
//! - Derived `PartialEq` is structural. Identity-aware comparison goes
//!   through [`Entity::same_identity`] explicitly.

pub mod category;
pub mod collection;
pub mod habit;
pub mod instance;
pub mod recurrence;
pub mod values;
pub mod weekday;

use values::Id;

/// Independently persisted aggregate with an optional store-assigned id.
pub trait Entity {
    fn id(&self) -> Option<&Id>;

    /// Compares every field, including `id`.
    fn same_fields(&self, other: &Self) -> bool;

    /// Identity-aware equality.
    ///
    /// Both ids set: compare ids only. Otherwise: compare all fields.
    fn same_identity(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Some(left), Some(right)) => left == right,
            _ => self.same_fields(other),
        }
    }

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}

/// Identity-aware comparison of two optional aggregates.
pub fn same_optional_identity<T: Entity>(left: Option<&T>, right: Option<&T>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left.same_identity(right),
        (None, None) => true,
        _ => false,
    }
}
