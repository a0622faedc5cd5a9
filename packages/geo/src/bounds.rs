//! Viewport filtering.
//!
//! The map sends the rectangle currently on screen. Filtering happens in
//! memory over rows already fetched from storage; bounds are never pushed
//! into the storage query.

use glamping_map_property_models::{BoundingBox, Coordinates};

/// Whether `point` lies inside `bounds` (edges inclusive).
///
/// When `east < west` the viewport wraps across the antimeridian and a
/// point matches if it is east of `west` *or* west of `east`.
#[must_use]
pub fn contains(bounds: &BoundingBox, point: Coordinates) -> bool {
    if point.lat < bounds.south || point.lat > bounds.north {
        return false;
    }

    if bounds.wraps_antimeridian() {
        point.lon >= bounds.west || point.lon <= bounds.east
    } else {
        point.lon >= bounds.west && point.lon <= bounds.east
    }
}

/// Keeps the items whose coordinates fall inside `bounds`.
///
/// With no bounds every item passes, including items without
/// coordinates. With bounds, items without coordinates are dropped.
#[must_use]
pub fn filter_by_bounds<T, F>(items: Vec<T>, bounds: Option<&BoundingBox>, coordinates: F) -> Vec<T>
where
    F: Fn(&T) -> Option<Coordinates>,
{
    let Some(bounds) = bounds else {
        return items;
    };

    items
        .into_iter()
        .filter(|item| coordinates(item).is_some_and(|c| contains(bounds, c)))
        .collect()
}
