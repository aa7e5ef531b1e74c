//! Habit use-case service.
//!
//! # Responsibility
//! - Turn caller input (strings, ids) into validated aggregates.
//! - Sequence repository calls for the create/record use-cases.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::category::HabitCategory;
use crate::model::collection::{CollectionError, HabitCollection};
use crate::model::habit::Habit;
use crate::model::instance::HabitInstance;
use crate::model::recurrence::{Recurrence, RecurrenceError};
use crate::model::values::{Color, ColorError, Id};
use crate::repo::habit_repo::{AggregateKind, HabitRepository, RepoError};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Recurrence(RecurrenceError),
    Color(ColorError),
    Collection(CollectionError),
    HabitNotFound(Id),
    CollectionNotFound(Id),
    /// Completion records cannot be created ahead of time.
    FutureDate { date: NaiveDate, today: NaiveDate },
    /// The instance was saved but the collection rewrite failed; the
    /// stored instance is not yet referenced by the collection.
    InstanceNotLinked {
        instance_id: Id,
        collection_id: Id,
        source: RepoError,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Recurrence(err) => write!(f, "{err}"),
            Self::Color(err) => write!(f, "{err}"),
            Self::Collection(err) => write!(f, "{err}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::CollectionNotFound(id) => write!(f, "habit collection not found: {id}"),
            Self::FutureDate { date, today } => write!(
                f,
                "cannot record a habit instance for future date {date} (today is {today})"
            ),
            Self::InstanceNotLinked {
                instance_id,
                collection_id,
                source,
            } => write!(
                f,
                "habit instance {instance_id} was saved but not added to collection {collection_id}: {source}"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Recurrence(err) => Some(err),
            Self::Color(err) => Some(err),
            Self::Collection(err) => Some(err),
            Self::HabitNotFound(_) => None,
            Self::CollectionNotFound(_) => None,
            Self::FutureDate { .. } => None,
            Self::InstanceNotLinked { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecurrenceError> for ServiceError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

impl From<ColorError> for ServiceError {
    fn from(value: ColorError) -> Self {
        Self::Color(value)
    }
}

impl From<CollectionError> for ServiceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// Request model for creating a habit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    /// Recurrence kind name, e.g. `Daily` or `bi-weekly`.
    pub recurrence: String,
    /// Weekday names; ignored for daily habits.
    pub recurrence_days: Vec<String>,
    pub description: Option<String>,
    /// Existing category to reuse, or new category to create, by name.
    pub category_name: Option<String>,
    pub category_description: Option<String>,
    pub category_color: Option<String>,
    pub color: Option<String>,
}

/// Request model for creating a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabitCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Request model for creating a collection from stored habits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabitCollection {
    pub name: String,
    pub description: Option<String>,
    /// Unknown ids are skipped, matching `get_habits_by_ids`.
    pub habit_ids: Vec<Id>,
}

/// Request model for recording one day's completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabitInstance {
    pub habit_id: Id,
    pub collection_id: Id,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
}

/// Use-case service wrapper for habit aggregates.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates and saves a habit.
    ///
    /// # Contract
    /// - Recurrence goes through the string factory.
    /// - A category named in the request is reused when it exists, otherwise
    ///   created first.
    pub fn create_habit(&self, request: &NewHabit) -> ServiceResult<Habit> {
        let recurrence =
            Recurrence::from_strings(&request.recurrence, &request.recurrence_days)?;
        let color = parse_color(request.color.as_deref())?;

        let category = match request.category_name.as_deref() {
            Some(name) => Some(self.find_or_create_category(
                name,
                request.category_description.as_deref(),
                request.category_color.as_deref(),
            )?),
            None => None,
        };

        let mut habit = Habit::new(request.name.clone(), recurrence);
        habit.description = request.description.clone();
        habit.category = category;
        habit.color = color;

        Ok(self.repo.save_habit(habit)?)
    }

    /// Creates and saves a category. Fails when the name is taken.
    pub fn create_habit_category(
        &self,
        request: &NewHabitCategory,
    ) -> ServiceResult<HabitCategory> {
        let category = HabitCategory {
            name: request.name.clone(),
            description: request.description.clone(),
            color: parse_color(request.color.as_deref())?,
            id: None,
        };
        Ok(self.repo.save_habit_category(category)?)
    }

    /// Creates and saves a collection linked to stored habits.
    pub fn create_habit_collection(
        &self,
        request: &NewHabitCollection,
    ) -> ServiceResult<HabitCollection> {
        let habits = if request.habit_ids.is_empty() {
            Vec::new()
        } else {
            self.repo.get_habits_by_ids(&request.habit_ids)?
        };

        let mut collection = HabitCollection::new(request.name.clone()).with_habits(habits);
        collection.description = request.description.clone();
        Ok(self.repo.save_habit_collection(collection)?)
    }

    /// Records a completion for a stored habit and links it to a collection.
    ///
    /// # Contract
    /// - The habit and the collection must exist.
    /// - `request.date` must not be after `today`.
    /// - The instance is saved, then the collection is rewritten with it.
    /// - A failed rewrite returns `InstanceNotLinked` with the saved
    ///   instance id, so the caller can link it again or clean it up.
    pub fn record_habit_instance(
        &self,
        request: &NewHabitInstance,
        today: NaiveDate,
    ) -> ServiceResult<HabitInstance> {
        if request.date > today {
            return Err(ServiceError::FutureDate {
                date: request.date,
                today,
            });
        }

        let habit = self
            .repo
            .get_habit_by_id(&request.habit_id)?
            .ok_or_else(|| ServiceError::HabitNotFound(request.habit_id.clone()))?;
        let mut collection = self
            .repo
            .get_habit_collection_by_id(&request.collection_id)?
            .ok_or_else(|| ServiceError::CollectionNotFound(request.collection_id.clone()))?;

        let mut instance = HabitInstance::new(habit, request.date, request.completed);
        instance.note = request.note.clone();
        let instance = self.repo.save_habit_instance(instance)?;

        let Some(instance_id) = instance.id.clone() else {
            return Err(RepoError::MissingId(AggregateKind::HabitInstance).into());
        };
        collection.add_habit_instance(instance.clone())?;
        if let Err(source) = self.repo.update_habit_collection(collection) {
            warn!(
                "event=habit_instance_record module=service status=error instance_id={instance_id} collection_id={}",
                request.collection_id
            );
            return Err(ServiceError::InstanceNotLinked {
                instance_id,
                collection_id: request.collection_id.clone(),
                source,
            });
        }

        info!(
            "event=habit_instance_record module=service status=ok collection_id={}",
            request.collection_id
        );
        Ok(instance)
    }

    /// [`Self::record_habit_instance`] against the local calendar date.
    pub fn record_habit_instance_today(
        &self,
        request: &NewHabitInstance,
    ) -> ServiceResult<HabitInstance> {
        self.record_habit_instance(request, Local::now().date_naive())
    }

    fn find_or_create_category(
        &self,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> ServiceResult<HabitCategory> {
        if let Some(existing) = self.repo.get_habit_category_by_name(name)? {
            return Ok(existing);
        }

        let category = HabitCategory {
            name: name.to_string(),
            description: description.map(str::to_string),
            color: parse_color(color)?,
            id: None,
        };
        Ok(self.repo.save_habit_category(category)?)
    }
}

fn parse_color(value: Option<&str>) -> Result<Option<Color>, ColorError> {
    value.map(Color::new).transpose()
}
