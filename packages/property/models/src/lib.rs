#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record types and storage query definitions.
//!
//! A property moves through three shapes on its way to the API:
//!
//! 1. [`RawPropertyRow`]: the untyped JSON object returned by storage.
//! 2. [`PropertyRecord`]: identity, location, and classification fields
//!    typed; every other column carried as an [`AttributeValue`].
//! 3. The projected JSON object built by `glamping_map_server_models`.
//!
//! [`PropertyQuery`] describes what the storage layer should return and is
//! shared by every `PropertyStore` implementation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// A `"Yes"`/`"No"` flag as stored in the amenity and status columns.
///
/// A missing flag is represented as `None` by the containing field rather
/// than as a third variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum YesNo {
    /// The attribute applies.
    Yes,
    /// The attribute does not apply.
    No,
}

impl YesNo {
    /// Parses a loosely formatted flag (`"yes"`, `"Y"`, `"true"`, ...).
    ///
    /// Returns `None` for anything that is not recognizably yes or no.
    #[must_use]
    pub fn parse_flag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Self::Yes),
            "no" | "n" | "false" => Some(Self::No),
            _ => None,
        }
    }

    /// Returns `true` for [`YesNo::Yes`].
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Workflow tag gating whether a researched property is shown publicly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResearchStatus {
    /// Freshly inserted by a research or import run.
    New,
    /// Research is underway.
    InProgress,
    /// Waiting for manual review.
    NeedsReview,
    /// Reviewed and visible on the site.
    Published,
    /// Reviewed and rejected.
    Rejected,
    /// A value this build does not know about. Never published.
    #[serde(other)]
    Unrecognized,
}

impl ResearchStatus {
    /// Parses a stored status string, ignoring case and surrounding
    /// whitespace, and mapping unknown values to
    /// [`ResearchStatus::Unrecognized`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value
            .trim()
            .to_ascii_lowercase()
            .parse()
            .unwrap_or(Self::Unrecognized)
    }
}

/// Returns whether a record with the given status may be shown publicly.
///
/// Rows without a status predate the research workflow and are public.
#[must_use]
pub const fn is_publicly_visible(status: Option<ResearchStatus>) -> bool {
    matches!(status, None | Some(ResearchStatus::Published))
}

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Creates a coordinate pair without validating it.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A map viewport in WGS84 degrees.
///
/// `east < west` means the viewport wraps across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northern latitude boundary.
    pub north: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Western longitude boundary.
    pub west: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given edges.
    #[must_use]
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Whether this viewport crosses the ±180° meridian.
    #[must_use]
    pub fn wraps_antimeridian(&self) -> bool {
        self.east < self.west
    }
}

/// An untyped row exactly as returned by storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPropertyRow(pub Map<String, Value>);

impl RawPropertyRow {
    /// Returns the value for `column`, treating JSON `null` as absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column).filter(|v| !v.is_null())
    }

    /// Returns the value for `column` as a trimmed, non-empty string.
    ///
    /// Numbers are rendered with their JSON representation so that a
    /// numeric `state` or `slug` still compares as text.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the numeric `id` column, accepting numeric strings.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        match self.get("id")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawPropertyRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A column value that is not part of the typed core of a
/// [`PropertyRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A `"Yes"`/`"No"` flag.
    Flag(YesNo),
    /// Free text.
    Text(String),
    /// A number (rates, counts).
    Number(Number),
    /// A native boolean.
    Bool(bool),
    /// An explicit `null`.
    Null,
}

impl AttributeValue {
    /// Converts a scalar JSON value. Arrays and objects do not conform and
    /// return `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => match s.trim() {
                t if t.eq_ignore_ascii_case("yes") => Self::Flag(YesNo::Yes),
                t if t.eq_ignore_ascii_case("no") => Self::Flag(YesNo::No),
                _ => Self::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => return None,
        })
    }

    /// Whether this value is [`AttributeValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts back into a JSON value for the API.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Flag(flag) => Value::String(flag.to_string()),
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
        }
    }
}

/// A typed property listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    /// Storage-assigned primary key.
    pub id: i64,
    /// URL-safe identifier shared by every row with the same name.
    pub slug: Option<String>,
    /// Human-readable property name.
    pub property_name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province, abbreviation or full name as stored.
    pub state: Option<String>,
    /// Country, free text as stored.
    pub country: Option<String>,
    /// Validated coordinates; `None` when missing or invalid.
    pub coordinates: Option<Coordinates>,
    /// Property type (e.g. "Glamping Resort").
    pub property_type: Option<String>,
    /// Unit type (e.g. "Yurt", "Safari Tent").
    pub unit_type: Option<String>,
    /// Rate bucket used by the map's rate filter.
    pub rate_category: Option<String>,
    /// Whether the listing is a glamping property.
    pub is_glamping_property: Option<YesNo>,
    /// Whether the property has closed.
    pub is_closed: Option<YesNo>,
    /// Research workflow status.
    pub research_status: Option<ResearchStatus>,
    /// Every other column, keyed by its public name.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl PropertyRecord {
    /// Creates a record with only an `id` set.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self {
            id,
            slug: None,
            property_name: None,
            address: None,
            city: None,
            state: None,
            country: None,
            coordinates: None,
            property_type: None,
            unit_type: None,
            rate_category: None,
            is_glamping_property: None,
            is_closed: None,
            research_status: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Whether the record may be shown on the public site.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        is_publicly_visible(self.research_status)
    }

    /// Whether the record is flagged closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_closed.is_some_and(YesNo::is_yes)
    }
}

/// A property paired with its distance from some origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyProperty {
    /// The nearby property.
    pub property: PropertyRecord,
    /// Great-circle distance from the origin in miles.
    pub distance_miles: f64,
}

/// Country restriction applied at the storage query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryFilter {
    /// Nothing was selected: return no rows at all.
    Deny,
    /// No country-level filtering.
    Any,
    /// Keep rows whose `country` is one of these raw values.
    OneOf(BTreeSet<String>),
}

/// Parameters for fetching properties from storage.
///
/// Storage always returns rows ordered by ascending `id` so that offset
/// pagination is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyQuery {
    /// Country restriction.
    pub countries: CountryFilter,
    /// Accepted raw `state` values; `None` = don't filter.
    pub states: Option<BTreeSet<String>>,
    /// Accepted `unit_type` values; `None` = don't filter.
    pub unit_types: Option<BTreeSet<String>>,
    /// Accepted `rate_category` values; `None` = don't filter.
    pub rate_categories: Option<BTreeSet<String>>,
    /// Only rows with non-null `lat` and `lon`.
    pub require_coordinates: bool,
    /// Only rows whose research status is public.
    pub published_only: bool,
    /// Include rows flagged `is_closed = "Yes"`.
    pub include_closed: bool,
}

impl PropertyQuery {
    /// Everything the public site may show, with no attribute filters.
    #[must_use]
    pub const fn public() -> Self {
        Self {
            countries: CountryFilter::Any,
            states: None,
            unit_types: None,
            rate_categories: None,
            require_coordinates: false,
            published_only: true,
            include_closed: false,
        }
    }

    /// Every row in the table, for maintenance work.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            countries: CountryFilter::Any,
            states: None,
            unit_types: None,
            rate_categories: None,
            require_coordinates: false,
            published_only: false,
            include_closed: true,
        }
    }

    /// Whether this query can be answered without touching storage.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self.countries, CountryFilter::Deny)
    }
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self::public()
    }
}
