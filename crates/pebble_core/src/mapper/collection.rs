//! Habit collection mapping.
//!
//! Schema: `name`, `description`, `habits` (ids), `habits_instances` (ids), `_id`?
//!
//! Members without an id are not representable by reference and are left
//! out; the repository rejects such collections before flattening.

use crate::mapper::{
    id_list, id_of, insert_id, optional_str, optional_value, required_str, Fields, MapperResult,
};
use crate::model::collection::HabitCollection;
use crate::model::habit::Habit;
use crate::model::instance::HabitInstance;
use crate::model::values::Id;
use serde_json::Value;

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const HABITS: &str = "habits";
pub const HABITS_INSTANCES: &str = "habits_instances";

pub fn to_fields(collection: &HabitCollection) -> Fields {
    let habit_ids = collection
        .habits()
        .iter()
        .filter_map(|habit| habit.id.as_ref())
        .map(|id| Value::from(id.as_str()))
        .collect();
    let instance_ids = collection
        .habit_instances()
        .iter()
        .filter_map(|instance| instance.id.as_ref())
        .map(|id| Value::from(id.as_str()))
        .collect();

    let mut fields = Fields::new();
    fields.insert(NAME.to_string(), Value::from(collection.name.as_str()));
    fields.insert(
        DESCRIPTION.to_string(),
        optional_value(collection.description.as_deref()),
    );
    fields.insert(HABITS.to_string(), Value::Array(habit_ids));
    fields.insert(HABITS_INSTANCES.to_string(), Value::Array(instance_ids));
    insert_id(&mut fields, collection.id.as_ref());
    fields
}

pub fn habit_ids(fields: &Fields) -> MapperResult<Vec<Id>> {
    id_list(fields, HABITS)
}

pub fn instance_ids(fields: &Fields) -> MapperResult<Vec<Id>> {
    id_list(fields, HABITS_INSTANCES)
}

/// Rebuilds a collection from stored fields and its resolved members.
pub fn from_fields(
    fields: &Fields,
    habits: Vec<Habit>,
    habit_instances: Vec<HabitInstance>,
) -> MapperResult<HabitCollection> {
    let mut collection = HabitCollection::new(required_str(fields, NAME)?)
        .with_habits(habits)
        .with_habit_instances(habit_instances);
    collection.description = optional_str(fields, DESCRIPTION)?.map(str::to_string);
    collection.id = id_of(fields)?;
    Ok(collection)
}
