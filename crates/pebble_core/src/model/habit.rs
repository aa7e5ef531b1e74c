//! Habit aggregate.

use crate::model::category::HabitCategory;
use crate::model::recurrence::Recurrence;
use crate::model::values::{Color, Description, Id, Name};
use crate::model::{same_optional_identity, Entity};

/// A repeated task with a recurrence rule.
///
/// The recurrence is owned by value. The category is a shared aggregate that
/// is stored by id and resolved again on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub name: Name,
    pub recurrence: Recurrence,
    pub description: Option<Description>,
    pub category: Option<HabitCategory>,
    pub color: Option<Color>,
    pub id: Option<Id>,
}

impl Habit {
    /// Creates a transient habit.
    pub fn new(name: impl Into<Name>, recurrence: Recurrence) -> Self {
        Self {
            name: name.into(),
            recurrence,
            description: None,
            category: None,
            color: None,
            id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<Description>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: HabitCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Entity for Habit {
    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.recurrence == other.recurrence
            && same_optional_identity(self.category.as_ref(), other.category.as_ref())
            && self.color == other.color
            && self.id == other.id
    }
}
