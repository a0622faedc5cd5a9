//! Conversion of typed records into API objects, and field projection.

use glamping_map_property_models::PropertyRecord;
use serde_json::{Map, Value};

use crate::ApiProperty;

/// Fields always returned when the caller asks for a subset.
pub const ESSENTIAL_FIELDS: &[&str] = &[
    "id",
    "property_name",
    "lat",
    "lon",
    "state",
    "country",
    "unit_type",
    "rate_category",
];

fn text(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.clone()))
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// The full public object for a record.
///
/// Core columns are always present (`null` when unknown); attributes
/// follow under their public names.
#[must_use]
pub fn to_api_property(record: &PropertyRecord) -> ApiProperty {
    let mut map = Map::new();
    map.insert("id".to_string(), Value::from(record.id));
    map.insert("slug".to_string(), text(record.slug.as_ref()));
    map.insert("property_name".to_string(), text(record.property_name.as_ref()));
    map.insert("address".to_string(), text(record.address.as_ref()));
    map.insert("city".to_string(), text(record.city.as_ref()));
    map.insert("state".to_string(), text(record.state.as_ref()));
    map.insert("country".to_string(), text(record.country.as_ref()));
    map.insert(
        "lat".to_string(),
        record.coordinates.map_or(Value::Null, |c| number(c.lat)),
    );
    map.insert(
        "lon".to_string(),
        record.coordinates.map_or(Value::Null, |c| number(c.lon)),
    );
    map.insert("property_type".to_string(), text(record.property_type.as_ref()));
    map.insert("unit_type".to_string(), text(record.unit_type.as_ref()));
    map.insert("rate_category".to_string(), text(record.rate_category.as_ref()));
    map.insert(
        "is_glamping_property".to_string(),
        record
            .is_glamping_property
            .map_or(Value::Null, |f| Value::String(f.to_string())),
    );
    map.insert(
        "is_closed".to_string(),
        record
            .is_closed
            .map_or(Value::Null, |f| Value::String(f.to_string())),
    );
    map.insert(
        "research_status".to_string(),
        record
            .research_status
            .map_or(Value::Null, |s| Value::String(s.to_string())),
    );

    for (column, value) in &record.attributes {
        map.entry(column.clone()).or_insert_with(|| value.to_json());
    }

    map
}

/// Restricts `property` to [`ESSENTIAL_FIELDS`] plus `fields`.
///
/// With no field list the object is returned unchanged. Requested fields
/// the object doesn't have are left out rather than set to `null`.
#[must_use]
pub fn project(property: ApiProperty, fields: Option<&[String]>) -> ApiProperty {
    let Some(fields) = fields else {
        return property;
    };

    property
        .into_iter()
        .filter(|(key, _)| {
            ESSENTIAL_FIELDS.contains(&key.as_str()) || fields.iter().any(|f| f == key)
        })
        .collect()
}
