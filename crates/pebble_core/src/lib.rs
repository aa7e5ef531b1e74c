//! Core domain logic for Pebble habit tracking.
//! This crate owns the recurrence model and the aggregate persistence layer.

pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use mapper::{Fields, MapperError};
pub use model::category::HabitCategory;
pub use model::collection::{CollectionError, HabitCollection};
pub use model::habit::Habit;
pub use model::instance::HabitInstance;
pub use model::recurrence::{
    recurrence_from_strings, DaysOfWeek, Recurrence, RecurrenceError, RecurrenceKind,
};
pub use model::values::{Color, ColorError, Description, Id, Name, Note};
pub use model::weekday::WeekDay;
pub use model::Entity;
pub use repo::habit_repo::{
    AggregateKind, DocumentHabitRepository, HabitRepository, RepoError, RepoResult,
    SqliteHabitRepository,
};
pub use service::habit_service::{
    HabitService, NewHabit, NewHabitCategory, NewHabitCollection, NewHabitInstance,
    ServiceError, ServiceResult,
};
pub use store::{DocumentStore, SqliteDocumentStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
