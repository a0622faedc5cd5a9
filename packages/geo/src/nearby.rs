//! Distance-based ranking of nearby properties.

use std::collections::BTreeSet;

use glamping_map_property_models::{Coordinates, NearbyProperty, PropertyRecord};

use crate::distance::haversine_miles;

/// Default search radius in miles.
pub const DEFAULT_RADIUS_MILES: f64 = 50.0;
/// Default number of results.
pub const DEFAULT_LIMIT: usize = 6;

/// Radius and result count for a nearby search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyOptions {
    /// Maximum distance from the origin, in miles (inclusive).
    pub radius_miles: f64,
    /// Maximum number of results.
    pub limit: usize,
}

impl Default for NearbyOptions {
    fn default() -> Self {
        Self {
            radius_miles: DEFAULT_RADIUS_MILES,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Ranks `candidates` by distance from `origin`.
///
/// Candidates are dropped when they have no valid coordinates, no slug,
/// share `exclude_slug`, or lie beyond the radius. The rest are sorted
/// ascending by distance (ties keep candidate order), de-duplicated by
/// slug keeping the closest row, and truncated to the limit.
#[must_use]
pub fn rank_nearby<I>(
    origin: Coordinates,
    exclude_slug: Option<&str>,
    candidates: I,
    options: NearbyOptions,
) -> Vec<NearbyProperty>
where
    I: IntoIterator<Item = PropertyRecord>,
{
    let mut within: Vec<NearbyProperty> = candidates
        .into_iter()
        .filter_map(|property| {
            let slug = property.slug.as_deref()?;
            if exclude_slug.is_some_and(|excluded| excluded == slug) {
                return None;
            }
            let distance_miles = haversine_miles(origin, property.coordinates?);
            (distance_miles <= options.radius_miles).then_some(NearbyProperty {
                property,
                distance_miles,
            })
        })
        .collect();

    // `sort_by` is stable, so equal distances keep fetch order.
    within.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));

    let mut seen: BTreeSet<String> = BTreeSet::new();
    within
        .into_iter()
        .filter(|n| {
            n.property
                .slug
                .as_ref()
                .is_some_and(|slug| seen.insert(slug.clone()))
        })
        .take(options.limit)
        .collect()
}
