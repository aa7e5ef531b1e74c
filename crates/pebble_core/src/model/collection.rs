//! Habit collection aggregate.
//!
//! # Invariants
//! - `habits` never holds two habits with the same identity.
//! - `habit_instances` never holds two instances with the same identity.
//! - The collection references habits/instances; it does not own their
//!   persistence. Storage keeps ids only.

use crate::model::habit::Habit;
use crate::model::instance::HabitInstance;
use crate::model::values::{Description, Id, Name};
use crate::model::Entity;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Membership violation on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    HabitAlreadyPresent(Name),
    InstanceAlreadyPresent(Option<Id>),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitAlreadyPresent(name) => {
                write!(f, "habit {name} already exists in the collection")
            }
            Self::InstanceAlreadyPresent(Some(id)) => {
                write!(f, "habit instance {id} already exists in the collection")
            }
            Self::InstanceAlreadyPresent(None) => {
                write!(f, "habit instance already exists in the collection")
            }
        }
    }
}

impl Error for CollectionError {}

/// Named group of habits and their completion records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCollection {
    pub name: Name,
    pub description: Option<Description>,
    pub id: Option<Id>,
    habits: Vec<Habit>,
    habit_instances: Vec<HabitInstance>,
}

impl HabitCollection {
    /// Creates an empty transient collection.
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            id: None,
            habits: Vec::new(),
            habit_instances: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<Description>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds every habit, keeping the first of any identity duplicates.
    pub fn with_habits(mut self, habits: impl IntoIterator<Item = Habit>) -> Self {
        for habit in habits {
            let _ = self.add_habit(habit);
        }
        self
    }

    /// Adds every instance, keeping the first of any identity duplicates.
    pub fn with_habit_instances(
        mut self,
        instances: impl IntoIterator<Item = HabitInstance>,
    ) -> Self {
        for instance in instances {
            let _ = self.add_habit_instance(instance);
        }
        self
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit_instances(&self) -> &[HabitInstance] {
        &self.habit_instances
    }

    pub fn contains_habit(&self, habit: &Habit) -> bool {
        self.habits.iter().any(|known| known.same_identity(habit))
    }

    pub fn contains_instance(&self, instance: &HabitInstance) -> bool {
        self.habit_instances
            .iter()
            .any(|known| known.same_identity(instance))
    }

    /// Adds a habit.
    ///
    /// # Errors
    /// - `HabitAlreadyPresent` when a habit with the same identity is present.
    pub fn add_habit(&mut self, habit: Habit) -> Result<(), CollectionError> {
        if self.contains_habit(&habit) {
            return Err(CollectionError::HabitAlreadyPresent(habit.name));
        }
        self.habits.push(habit);
        Ok(())
    }

    /// Adds a completion record.
    ///
    /// # Errors
    /// - `InstanceAlreadyPresent` when an instance with the same identity is present.
    pub fn add_habit_instance(&mut self, instance: HabitInstance) -> Result<(), CollectionError> {
        if self.contains_instance(&instance) {
            return Err(CollectionError::InstanceAlreadyPresent(instance.id));
        }
        self.habit_instances.push(instance);
        Ok(())
    }
}

impl Entity for HabitCollection {
    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.id == other.id
            && same_members(&self.habits, &other.habits)
            && same_members(&self.habit_instances, &other.habit_instances)
    }
}

fn same_members<T: Entity>(left: &[T], right: &[T]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|item| right.iter().any(|other| item.same_identity(other)))
}

#[cfg(test)]
mod tests {
    use super::{CollectionError, HabitCollection};
    use crate::model::habit::Habit;
    use crate::model::instance::HabitInstance;
    use crate::model::recurrence::Recurrence;
    use crate::model::Entity;
    use chrono::NaiveDate;

    #[test]
    fn add_habit_rejects_same_identity() {
        let mut collection = HabitCollection::new("Daily Habits");
        let habit = Habit::new("Drink Water", Recurrence::daily());

        collection.add_habit(habit.clone()).unwrap();
        let err = collection.add_habit(habit).unwrap_err();
        assert_eq!(
            err,
            CollectionError::HabitAlreadyPresent("Drink Water".to_string())
        );
        assert_eq!(
            err.to_string(),
            "habit Drink Water already exists in the collection"
        );
    }

    #[test]
    fn add_habit_accepts_distinct_ids_with_same_content() {
        let mut collection = HabitCollection::new("Daily Habits");
        collection
            .add_habit(Habit::new("Read", Recurrence::daily()).with_id("h1"))
            .unwrap();
        collection
            .add_habit(Habit::new("Read", Recurrence::daily()).with_id("h2"))
            .unwrap();
        assert_eq!(collection.habits().len(), 2);
    }

    #[test]
    fn with_habits_collapses_duplicates() {
        let habit = Habit::new("Read", Recurrence::daily()).with_id("h1");
        let collection =
            HabitCollection::new("Evening").with_habits([habit.clone(), habit.clone()]);
        assert_eq!(collection.habits().len(), 1);
        assert!(collection.contains_habit(&habit));
    }

    #[test]
    fn member_order_does_not_affect_field_comparison() {
        let a = Habit::new("A", Recurrence::daily()).with_id("a");
        let b = Habit::new("B", Recurrence::daily()).with_id("b");
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let instance = HabitInstance::new(a.clone(), day, true).with_id("i1");

        let left = HabitCollection::new("Mix")
            .with_habits([a.clone(), b.clone()])
            .with_habit_instances([instance.clone()]);
        let right = HabitCollection::new("Mix")
            .with_habits([b, a])
            .with_habit_instances([instance]);
        assert!(left.same_identity(&right));
    }
}
