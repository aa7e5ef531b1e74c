//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pebble_core` linkage.
//! - Optionally open a database and report per-aggregate document counts.
//!
//! Usage: `pebble [DB_PATH]` (falls back to `PEBBLE_DB_PATH`).

use pebble_core::db::migrations::{latest_version, schema_version};
use pebble_core::db::open_db;
use pebble_core::{AggregateKind, DocumentStore, SqliteDocumentStore};
use std::process::ExitCode;

const DB_PATH_ENV: &str = "PEBBLE_DB_PATH";

fn main() -> ExitCode {
    println!("pebble_core ping={}", pebble_core::ping());
    println!("pebble_core version={}", pebble_core::core_version());

    let Some(db_path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(DB_PATH_ENV).ok())
    else {
        return ExitCode::SUCCESS;
    };

    match report(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pebble: {err}");
            ExitCode::FAILURE
        }
    }
}

fn report(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let store = SqliteDocumentStore::new(&conn);

    println!(
        "schema_version={} latest={}",
        schema_version(&conn)?,
        latest_version()
    );
    for kind in [
        AggregateKind::HabitCategory,
        AggregateKind::Habit,
        AggregateKind::HabitInstance,
        AggregateKind::HabitCollection,
    ] {
        let name = kind.collection_name();
        println!("{name}={}", store.count(name)?);
    }
    Ok(())
}
