//! Habit category mapping.
//!
//! Schema: `name`, `description`, `color_hex`, `_id`?

use crate::mapper::{
    id_of, insert_id, optional_color, optional_str, optional_value, required_str, Fields,
    MapperResult,
};
use crate::model::category::HabitCategory;
use serde_json::Value;

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const COLOR_HEX: &str = "color_hex";

pub fn to_fields(category: &HabitCategory) -> Fields {
    let mut fields = Fields::new();
    fields.insert(NAME.to_string(), Value::from(category.name.as_str()));
    fields.insert(
        DESCRIPTION.to_string(),
        optional_value(category.description.as_deref()),
    );
    fields.insert(
        COLOR_HEX.to_string(),
        optional_value(category.color.as_ref().map(|color| color.hex())),
    );
    insert_id(&mut fields, category.id.as_ref());
    fields
}

pub fn from_fields(fields: &Fields) -> MapperResult<HabitCategory> {
    Ok(HabitCategory {
        name: required_str(fields, NAME)?.to_string(),
        description: optional_str(fields, DESCRIPTION)?.map(str::to_string),
        color: optional_color(fields, COLOR_HEX)?,
        id: id_of(fields)?,
    })
}
