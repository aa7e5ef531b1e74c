//! Habit instance mapping.
//!
//! Schema: `habit_id`, `date` (ISO-8601 `YYYY-MM-DD`), `completed`, `note`, `_id`?

use crate::mapper::{
    id_of, insert_id, optional_str, optional_value, required_str, Fields, MapperError,
    MapperResult,
};
use crate::model::habit::Habit;
use crate::model::instance::HabitInstance;
use crate::model::values::Id;
use chrono::NaiveDate;
use serde_json::Value;

pub const HABIT_ID: &str = "habit_id";
pub const DATE: &str = "date";
pub const COMPLETED: &str = "completed";
pub const NOTE: &str = "note";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn to_fields(instance: &HabitInstance) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        HABIT_ID.to_string(),
        optional_value(instance.habit.id.as_ref().map(Id::as_str)),
    );
    fields.insert(
        DATE.to_string(),
        Value::from(instance.date.format(DATE_FORMAT).to_string()),
    );
    fields.insert(COMPLETED.to_string(), Value::from(instance.completed));
    fields.insert(NOTE.to_string(), optional_value(instance.note.as_deref()));
    insert_id(&mut fields, instance.id.as_ref());
    fields
}

/// Returns the stored habit reference.
pub fn habit_id(fields: &Fields) -> MapperResult<Id> {
    Ok(Id::from(required_str(fields, HABIT_ID)?))
}

/// Rebuilds an instance from stored fields and its resolved habit.
pub fn from_fields(fields: &Fields, habit: Habit) -> MapperResult<HabitInstance> {
    let date_text = required_str(fields, DATE)?;
    let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|err| {
        MapperError::InvalidField {
            key: DATE,
            message: format!("`{date_text}` is not an ISO-8601 date: {err}"),
        }
    })?;

    let completed = match fields.get(COMPLETED) {
        Some(Value::Bool(value)) => *value,
        None | Some(Value::Null) => return Err(MapperError::MissingField(COMPLETED)),
        Some(other) => {
            return Err(MapperError::InvalidField {
                key: COMPLETED,
                message: format!("expected bool, got `{other}`"),
            })
        }
    };

    Ok(HabitInstance {
        habit,
        date,
        completed,
        note: optional_str(fields, NOTE)?.map(str::to_string),
        id: id_of(fields)?,
    })
}
