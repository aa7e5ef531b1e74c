//! Habit category aggregate.

use crate::model::values::{Color, Description, Id, Name};
use crate::model::Entity;

/// Grouping label shared by many habits.
///
/// `name` is the dedup key in storage: two categories may not share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCategory {
    pub name: Name,
    pub description: Option<Description>,
    pub color: Option<Color>,
    pub id: Option<Id>,
}

impl HabitCategory {
    /// Creates a transient category.
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: None,
            id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<Description>) -> Self {
        self.description = Some(description.into());
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

impl Entity for HabitCategory {
    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    fn same_fields(&self, other: &Self) -> bool {
        self == other
    }
}
