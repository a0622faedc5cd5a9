#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the glamping map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the storage row types so the API contract can evolve on its own.

pub mod projection;

use glamping_map_property_models::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A property as sent on the wire: a JSON object keyed by public column
/// name.
pub type ApiProperty = Map<String, Value>;

/// Parsed query string of `GET /api/properties`.
///
/// Built from the raw key/value pairs so that `country`, `state`,
/// `unitType` and `rateRange` can repeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQueryParams {
    /// Requested countries, as sent.
    pub countries: Vec<String>,
    /// Requested states or provinces, as sent.
    pub states: Vec<String>,
    /// Requested unit types.
    pub unit_types: Vec<String>,
    /// Requested rate categories.
    pub rate_ranges: Vec<String>,
    /// Viewport; only set when all four edges parse.
    pub bounds: Option<BoundingBox>,
    /// Requested output fields; `None` = the full record.
    pub fields: Option<Vec<String>>,
}

impl PropertyQueryParams {
    /// Collects parameters from query-string pairs. Unknown keys are
    /// ignored, as are blank values.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        let mut edges: [Option<f64>; 4] = [None; 4];
        let mut fields: Vec<String> = Vec::new();

        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "north" => edges[0] = parse_edge(value),
                "south" => edges[1] = parse_edge(value),
                "east" => edges[2] = parse_edge(value),
                "west" => edges[3] = parse_edge(value),
                "fields" => fields.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(ToString::to_string),
                ),
                _ if value.is_empty() => {}
                "country" => params.countries.push(value.to_string()),
                "state" => params.states.push(value.to_string()),
                "unitType" => params.unit_types.push(value.to_string()),
                "rateRange" => params.rate_ranges.push(value.to_string()),
                _ => {}
            }
        }

        if let [Some(north), Some(south), Some(east), Some(west)] = edges {
            params.bounds = Some(BoundingBox::new(north, south, east, west));
        }
        if !fields.is_empty() {
            params.fields = Some(fields);
        }

        params
    }

    /// Response-cache key: the serialized filter, bounds and fields tuple.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn parse_edge(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Successful list response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiList<T> {
    /// Always `true`.
    pub success: bool,
    /// The items.
    pub data: Vec<T>,
    /// `data.len()`.
    pub count: usize,
}

impl<T> ApiList<T> {
    /// Wraps `data` in a success envelope.
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count,
        }
    }
}

/// Successful single-item response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiItem<T> {
    /// Always `true`.
    pub success: bool,
    /// The item.
    pub data: T,
}

impl<T> ApiItem<T> {
    /// Wraps `data` in a success envelope.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// Short machine-readable error name.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

impl ApiError {
    /// Builds a failure envelope.
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// A property near another, with its distance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNearbyProperty {
    /// The nearby property (full record).
    pub property: ApiProperty,
    /// Distance from the viewed property in miles.
    pub distance_miles: f64,
}

/// `GET /api/properties/{slug}` response.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetailResponse {
    /// Always `true`.
    pub success: bool,
    /// The property (full record).
    pub data: ApiProperty,
    /// Closest other properties, nearest first.
    pub nearby: Vec<ApiNearbyProperty>,
}

/// `POST /api/revalidate` response.
#[derive(Debug, Clone, Serialize)]
pub struct RevalidateResponse {
    /// Always `true`.
    pub success: bool,
    /// The purged tag; `None` when everything was purged.
    pub tag: Option<String>,
    /// Number of cache entries removed.
    pub purged: usize,
}

/// Query parameters for `POST /api/revalidate`.
#[derive(Debug, Clone, Deserialize)]
pub struct RevalidateParams {
    /// Cache tag to purge; omit to purge everything.
    pub tag: Option<String>,
}

/// Query parameters for `GET /api/glossary`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlossaryParams {
    /// Restrict to one category.
    pub category: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
