//! Coordinate coercion and validation.
//!
//! Stored `lat`/`lon` columns hold strings, numbers, or nothing, depending
//! on which import wrote the row. Everything here fails closed: anything
//! that is not a finite, in-range number is treated as "no coordinates".

use glamping_map_property_models::Coordinates;
use serde_json::Value;

use crate::regions::Country;

/// Southern edge of the area the map serves (covers Hawaii).
pub const SERVICE_AREA_MIN_LAT: f64 = 18.0;
/// Northern edge of the area the map serves.
pub const SERVICE_AREA_MAX_LAT: f64 = 85.0;
/// Western edge of the area the map serves (covers the Aleutians).
pub const SERVICE_AREA_MIN_LON: f64 = -179.0;
/// Eastern edge of the area the map serves (covers Newfoundland).
pub const SERVICE_AREA_MAX_LON: f64 = -50.0;

/// Coerces a stored coordinate value to `f64`.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace is
/// ignored). Returns `None` for anything else, including `NaN` and
/// infinities.
#[must_use]
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Validates a latitude/longitude pair.
///
/// Returns `Some` iff both values are finite, `-90 <= lat <= 90`, and
/// `-180 <= lon <= 180`.
#[must_use]
pub fn validate(lat: f64, lon: f64) -> Option<Coordinates> {
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    valid.then(|| Coordinates::new(lat, lon))
}

/// Parses and validates a pair of raw stored values.
///
/// Both values must be present; a row with only one coordinate has none.
#[must_use]
pub fn from_values(lat: Option<&Value>, lon: Option<&Value>) -> Option<Coordinates> {
    let lat = parse_coordinate(lat?)?;
    let lon = parse_coordinate(lon?)?;
    validate(lat, lon)
}

/// Whether a point lies in the North American area the map serves.
///
/// Points outside it are excluded from map queries only; they are still
/// listed by non-geospatial reads.
#[must_use]
pub fn in_service_area(coordinates: Coordinates) -> bool {
    (SERVICE_AREA_MIN_LAT..=SERVICE_AREA_MAX_LAT).contains(&coordinates.lat)
        && (SERVICE_AREA_MIN_LON..=SERVICE_AREA_MAX_LON).contains(&coordinates.lon)
}

/// A latitude/longitude rectangle used by [`infer_country`].
struct Zone {
    south: f64,
    north: f64,
    west: f64,
    east: f64,
    country: Country,
}

impl Zone {
    fn contains(&self, c: Coordinates) -> bool {
        (self.south..=self.north).contains(&c.lat) && (self.west..=self.east).contains(&c.lon)
    }
}

/// Ordered zones; the first match wins. US enclaves that poke above the
/// Canadian boxes (Alaska, Maine) come before them.
const ZONES: &[Zone] = &[
    // Hawaii
    Zone {
        south: 18.5,
        north: 22.5,
        west: -160.5,
        east: -154.5,
        country: Country::UnitedStates,
    },
    // Alaska, west of the Yukon border
    Zone {
        south: 51.0,
        north: 71.5,
        west: -179.0,
        east: -141.0,
        country: Country::UnitedStates,
    },
    // Maine
    Zone {
        south: 43.0,
        north: 47.5,
        west: -71.1,
        east: -66.9,
        country: Country::UnitedStates,
    },
    // Everything north of the 49th parallel
    Zone {
        south: 49.0,
        north: 84.0,
        west: -141.0,
        east: -52.0,
        country: Country::Canada,
    },
    // Quebec and the Maritimes below 49°N
    Zone {
        south: 45.0,
        north: 49.0,
        west: -79.5,
        east: -52.0,
        country: Country::Canada,
    },
    // Golden Horseshoe and Georgian Bay
    Zone {
        south: 42.9,
        north: 45.0,
        west: -81.7,
        east: -79.1,
        country: Country::Canada,
    },
    // Southwestern Ontario
    Zone {
        south: 42.3,
        north: 43.0,
        west: -83.0,
        east: -80.5,
        country: Country::Canada,
    },
    // Northern Ontario east of Lake Superior
    Zone {
        south: 46.6,
        north: 49.0,
        west: -84.5,
        east: -79.5,
        country: Country::Canada,
    },
    // Thunder Bay
    Zone {
        south: 48.0,
        north: 49.0,
        west: -89.6,
        east: -84.5,
        country: Country::Canada,
    },
    // Contiguous United States
    Zone {
        south: 24.5,
        north: 49.0,
        west: -125.0,
        east: -66.9,
        country: Country::UnitedStates,
    },
];

/// Infers the country a point lies in from coarse bounding boxes.
///
/// This is a heuristic for filling missing `country` values: it is right
/// for the vast majority of listings but can misattribute points within a
/// few miles of the US/Canada border. Returns `None` outside both
/// countries.
#[must_use]
pub fn infer_country(coordinates: Coordinates) -> Option<Country> {
    ZONES
        .iter()
        .find(|zone| zone.contains(coordinates))
        .map(|zone| zone.country)
}
