#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial filtering for glamping map properties.
//!
//! Everything here is pure and synchronous:
//!
//! - [`regions`]: the USA + Canada state/province table and country
//!   aliases.
//! - [`normalize`]: expands requested country/state filters into the raw
//!   variants found in storage.
//! - [`coordinates`]: coerces and validates lat/lon, the service-area
//!   check, and coordinate-based country inference.
//! - [`bounds`]: viewport filtering with antimeridian wraparound.
//! - [`distance`]: Haversine great-circle distance in miles.
//! - [`nearby`]: ranks candidate properties by distance from an origin.

pub mod bounds;
pub mod coordinates;
pub mod distance;
pub mod nearby;
pub mod normalize;
pub mod regions;
