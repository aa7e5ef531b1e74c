//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the aggregate repository contract used by services.
//! - Own identity assignment, existence/uniqueness checks and reference
//!   resolution on read.
//!
//! # Invariants
//! - Point lookups return `Ok(None)` on a miss.
//! - Resolving an already-stored reference that is missing is `NotFound`.
//! - Saves never cascade: referenced aggregates must already be persisted.

pub mod habit_repo;
