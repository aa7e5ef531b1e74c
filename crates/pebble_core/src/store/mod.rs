//! Document store contract consumed by the repository.
//!
//! # Responsibility
//! - Describe the minimal key/value document operations the core needs.
//! - Keep transport details (SQL, drivers) out of the repository.
//!
//! # Invariants
//! - A document lives in exactly one named collection.
//! - Ids are generated by the store and never change after insert.
//! - `_id` is never part of a stored body; reads re-attach it.

pub mod sqlite;

use crate::db::DbError;
use crate::mapper::Fields;
use crate::model::values::Id;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use sqlite::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a document store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A uniqueness constraint rejected the write.
    Conflict {
        collection: String,
        message: String,
    },
    /// Stored body cannot be decoded into a flat record.
    InvalidDocument { collection: String, message: String },
    /// Equality filter on a compound (list/object) value.
    UnsupportedFilter(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict {
                collection,
                message,
            } => write!(f, "write conflict in `{collection}`: {message}"),
            Self::InvalidDocument {
                collection,
                message,
            } => write!(f, "invalid document in `{collection}`: {message}"),
            Self::UnsupportedFilter(key) => {
                write!(f, "unsupported equality filter on compound field `{key}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Conflict { .. } => None,
            Self::InvalidDocument { .. } => None,
            Self::UnsupportedFilter(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value document store addressed by named collections.
pub trait DocumentStore {
    /// Inserts one document and returns the generated id.
    fn insert_one(&self, collection: &str, fields: &Fields) -> StoreResult<Id>;
    /// Finds one document by id.
    fn find_one_by_id(&self, collection: &str, id: &Id) -> StoreResult<Option<Fields>>;
    /// Finds every document whose id is in `ids`; unknown ids are skipped.
    fn find_many_by_ids(&self, collection: &str, ids: &[Id]) -> StoreResult<Vec<Fields>>;
    /// Finds the oldest document whose top-level `key` equals `value`.
    fn find_one_by_field(
        &self,
        collection: &str,
        key: &str,
        value: &Value,
    ) -> StoreResult<Option<Fields>>;
    /// Replaces the body of one document. Returns `false` when no document matched.
    fn update_one_by_id(&self, collection: &str, id: &Id, fields: &Fields) -> StoreResult<bool>;
    /// Number of documents in a collection.
    fn count(&self, collection: &str) -> StoreResult<u64>;
}
