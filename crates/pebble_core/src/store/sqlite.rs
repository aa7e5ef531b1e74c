//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist flat records as JSON bodies in the `documents` table.
//! - Map SQLite uniqueness failures to [`StoreError::Conflict`].
//!
//! # Invariants
//! - `doc_id` is a UUIDv4 string generated on insert and never updated.
//! - Bodies are JSON objects without `_id`.
//! - Batch reads keep the caller's id order and drop duplicates.

use crate::mapper::{Fields, ID_KEY};
use crate::model::values::Id;
use crate::store::{DocumentStore, StoreError, StoreResult};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

// Stays below SQLITE_MAX_VARIABLE_NUMBER on older builds.
const MAX_IDS_PER_QUERY: usize = 500;

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn insert_one(&self, collection: &str, fields: &Fields) -> StoreResult<Id> {
        let id = Uuid::new_v4().to_string();
        let body = encode_body(collection, fields)?;

        self.conn
            .execute(
                "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);",
                params![collection, id, body],
            )
            .map_err(|err| map_write_error(collection, err))?;

        debug!("event=document_insert module=store status=ok collection={collection} id={id}");
        Ok(Id::from(id))
    }

    fn find_one_by_id(&self, collection: &str, id: &Id) -> StoreResult<Option<Fields>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body
             FROM documents
             WHERE collection = ?1 AND doc_id = ?2;",
        )?;
        let mut rows = stmt.query(params![collection, id.as_str()])?;
        if let Some(row) = rows.next()? {
            let doc_id: String = row.get("doc_id")?;
            let body: String = row.get("body")?;
            return Ok(Some(decode_body(collection, &doc_id, &body)?));
        }
        Ok(None)
    }

    fn find_many_by_ids(&self, collection: &str, ids: &[Id]) -> StoreResult<Vec<Fields>> {
        let mut found: HashMap<String, Fields> = HashMap::new();

        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT doc_id, body
                 FROM documents
                 WHERE collection = ? AND doc_id IN ({placeholders});"
            );
            let mut bind_values = vec![SqlValue::Text(collection.to_string())];
            bind_values.extend(chunk.iter().map(|id| SqlValue::Text(id.as_str().to_string())));

            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                let doc_id: String = row.get("doc_id")?;
                let body: String = row.get("body")?;
                let fields = decode_body(collection, &doc_id, &body)?;
                found.insert(doc_id, fields);
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| found.remove(id.as_str()))
            .collect())
    }

    fn find_one_by_field(
        &self,
        collection: &str,
        key: &str,
        value: &Value,
    ) -> StoreResult<Option<Fields>> {
        let path = format!("$.\"{}\"", key.replace('"', "\\\""));
        let mut bind_values = vec![
            SqlValue::Text(collection.to_string()),
            SqlValue::Text(path),
        ];
        let predicate = match value {
            Value::Null => "json_extract(body, ?2) IS NULL",
            Value::Bool(flag) => {
                bind_values.push(SqlValue::Integer(i64::from(*flag)));
                "json_extract(body, ?2) = ?3"
            }
            Value::Number(number) => {
                bind_values.push(match number.as_i64() {
                    Some(int) => SqlValue::Integer(int),
                    None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
                });
                "json_extract(body, ?2) = ?3"
            }
            Value::String(text) => {
                bind_values.push(SqlValue::Text(text.clone()));
                "json_extract(body, ?2) = ?3"
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(StoreError::UnsupportedFilter(key.to_string()));
            }
        };

        let sql = format!(
            "SELECT doc_id, body
             FROM documents
             WHERE collection = ?1 AND {predicate}
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            let doc_id: String = row.get("doc_id")?;
            let body: String = row.get("body")?;
            return Ok(Some(decode_body(collection, &doc_id, &body)?));
        }
        Ok(None)
    }

    fn update_one_by_id(&self, collection: &str, id: &Id, fields: &Fields) -> StoreResult<bool> {
        let body = encode_body(collection, fields)?;
        let changed = self
            .conn
            .execute(
                "UPDATE documents
                 SET
                    body = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, id.as_str(), body],
            )
            .map_err(|err| map_write_error(collection, err))?;

        debug!(
            "event=document_update module=store status=ok collection={collection} id={id} matched={}",
            changed > 0
        );
        Ok(changed > 0)
    }

    fn count(&self, collection: &str) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn encode_body(collection: &str, fields: &Fields) -> StoreResult<String> {
    let mut body = fields.clone();
    body.remove(ID_KEY);
    serde_json::to_string(&body).map_err(|err| StoreError::InvalidDocument {
        collection: collection.to_string(),
        message: err.to_string(),
    })
}

fn decode_body(collection: &str, doc_id: &str, body: &str) -> StoreResult<Fields> {
    let invalid = |message: String| StoreError::InvalidDocument {
        collection: collection.to_string(),
        message: format!("document `{doc_id}`: {message}"),
    };

    let value: Value = serde_json::from_str(body).map_err(|err| invalid(err.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(invalid("body is not a JSON object".to_string()));
    };
    fields.insert(ID_KEY.to_string(), Value::from(doc_id));
    Ok(fields)
}

fn map_write_error(collection: &str, err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict {
                collection: collection.to_string(),
                message: message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            }
        }
        _ => StoreError::from(err),
    }
}
