//! Habit mapping.
//!
//! Schema: `name`, `recurrence`, `recurrence_days`, `description`,
//! `category_id`, `color_hex`, `_id`?
//!
//! The recurrence is stored as its kind name plus the current day names and
//! rebuilt through the recurrence factory. The category is stored as an id
//! and must be resolved by the caller before [`from_fields`].

use crate::mapper::{
    id_of, insert_id, optional_color, optional_str, optional_value, required_str, string_list,
    Fields, MapperResult,
};
use crate::model::category::HabitCategory;
use crate::model::habit::Habit;
use crate::model::recurrence::Recurrence;
use crate::model::values::Id;
use serde_json::Value;

pub const NAME: &str = "name";
pub const RECURRENCE: &str = "recurrence";
pub const RECURRENCE_DAYS: &str = "recurrence_days";
pub const DESCRIPTION: &str = "description";
pub const CATEGORY_ID: &str = "category_id";
pub const COLOR_HEX: &str = "color_hex";

pub fn to_fields(habit: &Habit) -> Fields {
    let days: Vec<Value> = habit
        .recurrence
        .days_of_week()
        .into_iter()
        .flatten()
        .map(|day| Value::from(day.as_str()))
        .collect();

    let mut fields = Fields::new();
    fields.insert(NAME.to_string(), Value::from(habit.name.as_str()));
    fields.insert(RECURRENCE.to_string(), Value::from(habit.recurrence.name()));
    fields.insert(RECURRENCE_DAYS.to_string(), Value::Array(days));
    fields.insert(
        DESCRIPTION.to_string(),
        optional_value(habit.description.as_deref()),
    );
    fields.insert(
        CATEGORY_ID.to_string(),
        optional_value(
            habit
                .category
                .as_ref()
                .and_then(|category| category.id.as_ref())
                .map(Id::as_str),
        ),
    );
    fields.insert(
        COLOR_HEX.to_string(),
        optional_value(habit.color.as_ref().map(|color| color.hex())),
    );
    insert_id(&mut fields, habit.id.as_ref());
    fields
}

/// Returns the stored category reference, if any.
pub fn category_id(fields: &Fields) -> MapperResult<Option<Id>> {
    Ok(optional_str(fields, CATEGORY_ID)?.map(Id::from))
}

/// Rebuilds a habit from stored fields and its resolved category.
pub fn from_fields(fields: &Fields, category: Option<HabitCategory>) -> MapperResult<Habit> {
    let recurrence = Recurrence::from_strings(
        required_str(fields, RECURRENCE)?,
        string_list(fields, RECURRENCE_DAYS)?,
    )?;

    Ok(Habit {
        name: required_str(fields, NAME)?.to_string(),
        recurrence,
        description: optional_str(fields, DESCRIPTION)?.map(str::to_string),
        category,
        color: optional_color(fields, COLOR_HEX)?,
        id: id_of(fields)?,
    })
}
