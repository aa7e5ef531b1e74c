//! Habit instance aggregate: one day's completion record.

use crate::model::habit::Habit;
use crate::model::values::{Id, Note};
use crate::model::Entity;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitInstance {
    pub habit: Habit,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<Note>,
    pub id: Option<Id>,
}

impl HabitInstance {
    /// Creates a transient instance for `habit` on `date`.
    pub fn new(habit: Habit, date: NaiveDate, completed: bool) -> Self {
        Self {
            habit,
            date,
            completed,
            note: None,
            id: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<Note>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Entity for HabitInstance {
    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.habit.same_identity(&other.habit)
            && self.date == other.date
            && self.completed == other.completed
            && self.note == other.note
            && self.id == other.id
    }
}
