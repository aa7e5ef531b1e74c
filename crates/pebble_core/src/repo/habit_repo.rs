//! Habit aggregate repository contract and document-store implementation.
//!
//! # Responsibility
//! - Persist categories, habits, instances and collections as flat records,
//!   one store collection per aggregate kind.
//! - Rebuild full object graphs on read by resolving id references.
//!
//! # Invariants
//! - `save_*` is the only transient -> persisted transition; ids come from
//!   the store.
//! - Category names are unique. The pre-insert lookup is backed by a store
//!   unique index, so a racing duplicate still surfaces as `AlreadyExists`.
//! - Saves resolve every outgoing reference first; a reference that is not
//!   stored fails with `NotFound` and nothing is written.
//! - A collection read either resolves every referenced habit and instance or
//!   fails with `NotFound`; nothing is silently dropped.
//! - No caching: every call reads through to the store.

use crate::mapper::{self, Fields, MapperError};
use crate::model::category::HabitCategory;
use crate::model::collection::HabitCollection;
use crate::model::habit::Habit;
use crate::model::instance::HabitInstance;
use crate::model::values::Id;
use crate::store::{DocumentStore, SqliteDocumentStore, StoreError};
use log::{debug, info, warn};
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Aggregate kinds, each stored in its own named collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Habit,
    HabitCategory,
    HabitCollection,
    HabitInstance,
}

impl AggregateKind {
    /// Store collection name for this kind.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Habit => "habits",
            Self::HabitCategory => "habit_categories",
            Self::HabitCollection => "habit_collections",
            Self::HabitInstance => "habit_instances",
        }
    }
}

impl Display for AggregateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Habit => "habit",
            Self::HabitCategory => "habit category",
            Self::HabitCollection => "habit collection",
            Self::HabitInstance => "habit instance",
        };
        f.write_str(label)
    }
}

/// Repository error for habit persistence and graph resolution.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// Stored record cannot be turned back into an aggregate.
    InvalidData(MapperError),
    /// Identity or uniqueness collision on save. `key` is the id or, for
    /// categories, the name.
    AlreadyExists { kind: AggregateKind, key: String },
    /// Required aggregate is missing (update target or dangling reference).
    NotFound { kind: AggregateKind, id: Id },
    /// Caller passed a transient aggregate where a persisted one is required.
    MissingId(AggregateKind),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData(err) => write!(f, "invalid persisted data: {err}"),
            Self::AlreadyExists { kind, key } => write!(f, "{kind} `{key}` already exists"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MissingId(kind) => write!(f, "{kind} has no id; save it first"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData(err) => Some(err),
            Self::AlreadyExists { .. } => None,
            Self::NotFound { .. } => None,
            Self::MissingId(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<MapperError> for RepoError {
    fn from(value: MapperError) -> Self {
        Self::InvalidData(value)
    }
}

/// Repository interface for habit aggregates.
pub trait HabitRepository {
    /// Persists a new habit and returns it with its assigned id.
    fn save_habit(&self, habit: Habit) -> RepoResult<Habit>;
    fn get_habit_by_id(&self, id: &Id) -> RepoResult<Option<Habit>>;
    /// Batch lookup; unknown ids are omitted and duplicates collapse.
    fn get_habits_by_ids(&self, ids: &[Id]) -> RepoResult<Vec<Habit>>;

    /// Persists a new category; names are unique.
    fn save_habit_category(&self, category: HabitCategory) -> RepoResult<HabitCategory>;
    fn get_habit_category_by_name(&self, name: &str) -> RepoResult<Option<HabitCategory>>;
    fn get_habit_category_by_id(&self, id: &Id) -> RepoResult<Option<HabitCategory>>;

    /// Persists a new collection referencing already-persisted members.
    fn save_habit_collection(&self, collection: HabitCollection) -> RepoResult<HabitCollection>;
    /// Overwrites a stored collection and returns the input unchanged.
    fn update_habit_collection(&self, collection: HabitCollection)
        -> RepoResult<HabitCollection>;
    fn get_habit_collection_by_id(&self, id: &Id) -> RepoResult<Option<HabitCollection>>;

    /// Persists a new instance of an already-persisted habit.
    fn save_habit_instance(&self, instance: HabitInstance) -> RepoResult<HabitInstance>;
    fn get_habit_instance_by_id(&self, id: &Id) -> RepoResult<Option<HabitInstance>>;
}

/// Habit repository over any [`DocumentStore`].
pub struct DocumentHabitRepository<S> {
    store: S,
}

/// Habit repository over a migrated SQLite connection.
pub type SqliteHabitRepository<'conn> = DocumentHabitRepository<SqliteDocumentStore<'conn>>;

impl<S: DocumentStore> DocumentHabitRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_absent(&self, kind: AggregateKind, id: Option<&Id>) -> RepoResult<()> {
        let Some(id) = id else {
            return Ok(());
        };
        if self
            .store
            .find_one_by_id(kind.collection_name(), id)?
            .is_some()
        {
            warn!("event=aggregate_save module=repo status=conflict kind={kind:?} id={id}");
            return Err(RepoError::AlreadyExists {
                kind,
                key: id.to_string(),
            });
        }
        Ok(())
    }

    /// Fails with `NotFound` unless `id` is stored under `kind`.
    fn ensure_stored(&self, kind: AggregateKind, id: &Id) -> RepoResult<()> {
        if self
            .store
            .find_one_by_id(kind.collection_name(), id)?
            .is_none()
        {
            return Err(dangling(kind, id.clone()));
        }
        Ok(())
    }

    /// Fails with `NotFound` on the first id in `ids` not stored under `kind`.
    fn ensure_all_stored(&self, kind: AggregateKind, ids: &[Id]) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self
            .store
            .find_many_by_ids(kind.collection_name(), ids)?
            .iter()
            .map(mapper::id_of)
            .collect::<Result<Vec<_>, _>>()?;
        match ids.iter().find(|id| !found.iter().any(|known| known.as_ref() == Some(*id))) {
            Some(missing) => Err(dangling(kind, missing.clone())),
            None => Ok(()),
        }
    }

    /// Collection members must carry ids that resolve in the store.
    fn ensure_members_stored(&self, collection: &HabitCollection) -> RepoResult<()> {
        let habit_ids = collection
            .habits()
            .iter()
            .map(|habit| habit.id.clone().ok_or(RepoError::MissingId(AggregateKind::Habit)))
            .collect::<RepoResult<Vec<_>>>()?;
        let instance_ids = collection
            .habit_instances()
            .iter()
            .map(|instance| {
                instance
                    .id
                    .clone()
                    .ok_or(RepoError::MissingId(AggregateKind::HabitInstance))
            })
            .collect::<RepoResult<Vec<_>>>()?;

        self.ensure_all_stored(AggregateKind::Habit, &habit_ids)?;
        self.ensure_all_stored(AggregateKind::HabitInstance, &instance_ids)
    }

    /// Inserts a flattened aggregate. `unique_key` names the value guarded by
    /// a store unique index, when the kind has one.
    fn insert(
        &self,
        kind: AggregateKind,
        fields: &Fields,
        unique_key: Option<&str>,
    ) -> RepoResult<Id> {
        match self.store.insert_one(kind.collection_name(), fields) {
            Ok(id) => {
                info!("event=aggregate_save module=repo status=ok kind={kind:?} id={id}");
                Ok(id)
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("event=aggregate_save module=repo status=conflict kind={kind:?} source=store");
                Err(RepoError::AlreadyExists {
                    kind,
                    key: unique_key.unwrap_or("<generated id>").to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn inflate_habit(&self, fields: &Fields) -> RepoResult<Habit> {
        let category = match mapper::habit::category_id(fields)? {
            Some(category_id) => Some(
                self.get_habit_category_by_id(&category_id)?
                    .ok_or_else(|| dangling(AggregateKind::HabitCategory, category_id))?,
            ),
            None => None,
        };
        Ok(mapper::habit::from_fields(fields, category)?)
    }

    fn inflate_collection(&self, fields: &Fields) -> RepoResult<HabitCollection> {
        let habit_ids = mapper::collection::habit_ids(fields)?;
        let habits = self.get_habits_by_ids(&habit_ids)?;
        if let Some(missing) = habit_ids
            .iter()
            .find(|id| !habits.iter().any(|habit| habit.id.as_ref() == Some(*id)))
        {
            return Err(dangling(AggregateKind::Habit, missing.clone()));
        }

        let instances = mapper::collection::instance_ids(fields)?
            .into_iter()
            .map(|instance_id| {
                self.get_habit_instance_by_id(&instance_id)?
                    .ok_or_else(|| dangling(AggregateKind::HabitInstance, instance_id))
            })
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(mapper::collection::from_fields(fields, habits, instances)?)
    }
}

impl<S: DocumentStore> HabitRepository for DocumentHabitRepository<S> {
    fn save_habit(&self, mut habit: Habit) -> RepoResult<Habit> {
        self.ensure_absent(AggregateKind::Habit, habit.id.as_ref())?;
        if let Some(category) = habit.category.as_ref() {
            let category_id = category
                .id
                .as_ref()
                .ok_or(RepoError::MissingId(AggregateKind::HabitCategory))?;
            self.ensure_stored(AggregateKind::HabitCategory, category_id)?;
        }

        // A fresh id is always assigned; a supplied unknown id is not reused.
        habit.id = None;
        let fields = mapper::habit::to_fields(&habit);
        let id = self.insert(AggregateKind::Habit, &fields, None)?;
        habit.id = Some(id);
        Ok(habit)
    }

    fn get_habit_by_id(&self, id: &Id) -> RepoResult<Option<Habit>> {
        match self
            .store
            .find_one_by_id(AggregateKind::Habit.collection_name(), id)?
        {
            Some(fields) => Ok(Some(self.inflate_habit(&fields)?)),
            None => {
                debug!("event=habit_get module=repo status=miss id={id}");
                Ok(None)
            }
        }
    }

    fn get_habits_by_ids(&self, ids: &[Id]) -> RepoResult<Vec<Habit>> {
        let mut unique: Vec<Id> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        self.store
            .find_many_by_ids(AggregateKind::Habit.collection_name(), &unique)?
            .iter()
            .map(|fields| self.inflate_habit(fields))
            .collect()
    }

    fn save_habit_category(&self, mut category: HabitCategory) -> RepoResult<HabitCategory> {
        if self.get_habit_category_by_name(&category.name)?.is_some() {
            warn!("event=aggregate_save module=repo status=conflict kind=HabitCategory key=name");
            return Err(RepoError::AlreadyExists {
                kind: AggregateKind::HabitCategory,
                key: category.name,
            });
        }

        category.id = None;
        let fields = mapper::category::to_fields(&category);
        let id = self.insert(AggregateKind::HabitCategory, &fields, Some(&category.name))?;
        category.id = Some(id);
        Ok(category)
    }

    fn get_habit_category_by_name(&self, name: &str) -> RepoResult<Option<HabitCategory>> {
        let fields = self.store.find_one_by_field(
            AggregateKind::HabitCategory.collection_name(),
            mapper::category::NAME,
            &Value::from(name),
        )?;
        Ok(fields
            .as_ref()
            .map(mapper::category::from_fields)
            .transpose()?)
    }

    fn get_habit_category_by_id(&self, id: &Id) -> RepoResult<Option<HabitCategory>> {
        let fields = self
            .store
            .find_one_by_id(AggregateKind::HabitCategory.collection_name(), id)?;
        Ok(fields
            .as_ref()
            .map(mapper::category::from_fields)
            .transpose()?)
    }

    fn save_habit_collection(
        &self,
        mut collection: HabitCollection,
    ) -> RepoResult<HabitCollection> {
        self.ensure_absent(AggregateKind::HabitCollection, collection.id.as_ref())?;
        self.ensure_members_stored(&collection)?;

        collection.id = None;
        let fields = mapper::collection::to_fields(&collection);
        let id = self.insert(AggregateKind::HabitCollection, &fields, None)?;
        collection.id = Some(id);
        Ok(collection)
    }

    fn update_habit_collection(
        &self,
        collection: HabitCollection,
    ) -> RepoResult<HabitCollection> {
        let Some(id) = collection.id.as_ref() else {
            return Err(RepoError::MissingId(AggregateKind::HabitCollection));
        };
        self.ensure_members_stored(&collection)?;

        let fields = mapper::collection::to_fields(&collection);
        let matched = self.store.update_one_by_id(
            AggregateKind::HabitCollection.collection_name(),
            id,
            &fields,
        )?;
        if !matched {
            return Err(RepoError::NotFound {
                kind: AggregateKind::HabitCollection,
                id: id.clone(),
            });
        }

        info!("event=aggregate_update module=repo status=ok kind=HabitCollection id={id}");
        Ok(collection)
    }

    fn get_habit_collection_by_id(&self, id: &Id) -> RepoResult<Option<HabitCollection>> {
        match self
            .store
            .find_one_by_id(AggregateKind::HabitCollection.collection_name(), id)?
        {
            Some(fields) => Ok(Some(self.inflate_collection(&fields)?)),
            None => {
                debug!("event=habit_collection_get module=repo status=miss id={id}");
                Ok(None)
            }
        }
    }

    fn save_habit_instance(&self, mut instance: HabitInstance) -> RepoResult<HabitInstance> {
        self.ensure_absent(AggregateKind::HabitInstance, instance.id.as_ref())?;
        let habit_id = instance
            .habit
            .id
            .as_ref()
            .ok_or(RepoError::MissingId(AggregateKind::Habit))?;
        self.ensure_stored(AggregateKind::Habit, habit_id)?;

        instance.id = None;
        let fields = mapper::instance::to_fields(&instance);
        let id = self.insert(AggregateKind::HabitInstance, &fields, None)?;
        instance.id = Some(id);
        Ok(instance)
    }

    fn get_habit_instance_by_id(&self, id: &Id) -> RepoResult<Option<HabitInstance>> {
        let Some(fields) = self
            .store
            .find_one_by_id(AggregateKind::HabitInstance.collection_name(), id)?
        else {
            debug!("event=habit_instance_get module=repo status=miss id={id}");
            return Ok(None);
        };

        let habit_id = mapper::instance::habit_id(&fields)?;
        let habit = self
            .get_habit_by_id(&habit_id)?
            .ok_or_else(|| dangling(AggregateKind::Habit, habit_id))?;
        Ok(Some(mapper::instance::from_fields(&fields, habit)?))
    }
}

impl<'conn> DocumentHabitRepository<SqliteDocumentStore<'conn>> {
    /// Builds a repository over a connection from `open_db`/`open_db_in_memory`.
    pub fn from_connection(conn: &'conn Connection) -> Self {
        Self::new(SqliteDocumentStore::new(conn))
    }
}

fn dangling(kind: AggregateKind, id: Id) -> RepoError {
    warn!("event=reference_resolve module=repo status=dangling kind={kind:?} id={id}");
    RepoError::NotFound { kind, id }
}
