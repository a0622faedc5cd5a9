//! Conversion from raw storage rows to typed property records.
//!
//! Some storage columns use a double-underscore convention
//! (`rate__avg_retail_daily_rate_2024`). Those are exposed under their
//! public name, with every run of underscores collapsed to one, before
//! anything else looks at the row.

use glamping_map_geo::coordinates;
use glamping_map_property_models::{
    AttributeValue, PropertyRecord, RawPropertyRow, ResearchStatus, YesNo,
};
use serde_json::{Map, Value};

/// Columns that become typed fields on [`PropertyRecord`] rather than
/// entries in its attribute map.
pub const CORE_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "property_name",
    "address",
    "city",
    "state",
    "country",
    "lat",
    "lon",
    "property_type",
    "unit_type",
    "rate_category",
    "is_glamping_property",
    "is_closed",
    "research_status",
];

/// Returns the public name for a storage column.
///
/// Runs of two or more underscores collapse to a single underscore. Names
/// without `__` are returned unchanged.
#[must_use]
pub fn public_column_name(column: &str) -> String {
    if !column.contains("__") {
        return column.to_string();
    }

    let mut name = String::with_capacity(column.len());
    for c in column.chars() {
        if c == '_' && name.ends_with('_') {
            continue;
        }
        name.push(c);
    }
    name
}

/// Renames double-underscore columns to their public names.
///
/// When the public name is already present with a non-null value, that
/// value wins and the raw column is discarded. The raw name never
/// survives.
#[must_use]
pub fn remap_columns(row: &RawPropertyRow) -> Map<String, Value> {
    let mut remapped: Map<String, Value> = row
        .0
        .iter()
        .filter(|(column, _)| !column.contains("__"))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect();

    for (column, value) in row.0.iter().filter(|(column, _)| column.contains("__")) {
        let public = public_column_name(column);
        let occupied = remapped.get(&public).is_some_and(|v| !v.is_null());
        if !occupied {
            remapped.insert(public, value.clone());
        }
    }

    remapped
}

/// Converts a raw row into a typed record.
///
/// Returns `None` (logged at debug level) for rows without a usable `id`.
/// Invalid coordinates become `None` rather than rejecting the row, and
/// attribute columns holding arrays or objects are dropped.
#[must_use]
pub fn to_record(raw: &RawPropertyRow) -> Option<PropertyRecord> {
    let Some(id) = raw.id() else {
        log::debug!("Skipping row without a numeric id: {:?}", raw.get("id"));
        return None;
    };

    let row = RawPropertyRow(remap_columns(raw));
    let flag = |column: &str| row.text(column).and_then(|v| YesNo::parse_flag(&v));

    let mut record = PropertyRecord::new(id);
    record.slug = row.text("slug");
    record.property_name = row.text("property_name");
    record.address = row.text("address");
    record.city = row.text("city");
    record.state = row.text("state");
    record.country = row.text("country");
    record.coordinates = coordinates::from_values(row.get("lat"), row.get("lon"));
    record.property_type = row.text("property_type");
    record.unit_type = row.text("unit_type");
    record.rate_category = row.text("rate_category");
    record.is_glamping_property = flag("is_glamping_property");
    record.is_closed = flag("is_closed");
    record.research_status = row
        .text("research_status")
        .map(|status| ResearchStatus::parse_lenient(&status));

    for (column, value) in &row.0 {
        if CORE_COLUMNS.contains(&column.as_str()) {
            continue;
        }
        match AttributeValue::from_json(value) {
            Some(attribute) => {
                record.attributes.insert(column.clone(), attribute);
            }
            None => log::debug!("Property {id}: dropping non-scalar column {column}"),
        }
    }

    Some(record)
}

/// Converts rows, skipping the ones without an id.
#[must_use]
pub fn to_records(rows: Vec<RawPropertyRow>) -> Vec<PropertyRecord> {
    rows.iter().filter_map(to_record).collect()
}
