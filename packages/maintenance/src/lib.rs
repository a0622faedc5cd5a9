#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data upkeep for the properties table.
//!
//! Every command reads the whole table, works out what it would change,
//! and only writes when asked to. Writes go through
//! [`PropertyStore::fill_missing`], so they never overwrite a value that
//! is already set.

use std::collections::{BTreeMap, BTreeSet};

use glamping_map_content::slug::extend_slugs;
use glamping_map_database::queries::fetch_rows;
use glamping_map_database::{PropertyStore, StoreError};
use glamping_map_geo::coordinates::{from_values, in_service_area, infer_country};
use glamping_map_geo::regions::{
    Country, canonical_country, canonical_state_name, lookup_region, state_abbreviation,
};
use glamping_map_property_models::{PropertyQuery, RawPropertyRow};

/// Errors raised by maintenance commands.
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    /// A storage read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A value a command wants to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFill {
    /// Row id.
    pub id: i64,
    /// Value to write.
    pub value: String,
}

/// A row whose stored slug differs from the slug its name already holds
/// elsewhere. Never rewritten automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugConflict {
    /// Row id.
    pub id: i64,
    /// Slug currently stored.
    pub current: String,
    /// Slug held by the name's earliest slugged row.
    pub planned: String,
}

/// Outcome of [`assign_missing_slugs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugReport {
    /// Rows without a slug and the slug they should get.
    pub missing: Vec<PlannedFill>,
    /// Rows whose existing slug differs from the one their name holds.
    pub conflicts: Vec<SlugConflict>,
    /// Rows without a name, which cannot be given a slug.
    pub unnamed: usize,
    /// Number of slugs actually written.
    pub written: usize,
}

/// Outcome of [`fill_missing_countries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryReport {
    /// Rows without a country whose coordinates resolve to one.
    pub inferred: Vec<PlannedFill>,
    /// Rows without a country and without usable coordinates, or outside
    /// both countries.
    pub unresolved: usize,
    /// Rows whose country is a recognized but non-canonical spelling
    /// (`"USA"` rather than `"United States"`). Reported only.
    pub variant_spellings: Vec<CountrySpelling>,
    /// Number of countries actually written.
    pub written: usize,
}

/// A stored country value and its canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySpelling {
    /// Row id.
    pub id: i64,
    /// Value as stored.
    pub current: String,
    /// Canonical display name.
    pub canonical: &'static str,
}

/// A state value that isn't stored under its canonical full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSuggestion {
    /// Row id.
    pub id: i64,
    /// Value as stored.
    pub current: String,
    /// Canonical full name.
    pub canonical: &'static str,
    /// Two-letter abbreviation.
    pub abbreviation: &'static str,
    /// The row's country disagrees with the region's country
    /// (e.g. `"CA"` on a Canadian row).
    pub country_mismatch: bool,
}

/// Outcome of [`audit_coordinates`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateAudit {
    /// Rows checked.
    pub total: usize,
    /// Valid and inside the service area.
    pub valid: usize,
    /// `lat` or `lon` missing.
    pub missing: usize,
    /// Present but not a valid coordinate pair.
    pub invalid: usize,
    /// Valid but outside the service area.
    pub out_of_area: usize,
}

async fn all_rows(store: &dyn PropertyStore) -> Result<Vec<RawPropertyRow>, MaintenanceError> {
    let rows = fetch_rows(store, &PropertyQuery::everything(), None).await?;
    log::info!("Read {} property rows", rows.len());
    Ok(rows)
}

/// Plans slugs for every named row and, when `apply` is set, writes them
/// to rows that have none.
///
/// Slugs already in storage are kept: a name whose rows already carry a
/// slug reuses the earliest row's slug for its unslugged rows, and every
/// stored slug is reserved so a new name never takes one.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if a storage read or write fails.
pub async fn assign_missing_slugs(
    store: &dyn PropertyStore,
    apply: bool,
) -> Result<SlugReport, MaintenanceError> {
    let rows = all_rows(store).await?;

    let mut existing: BTreeMap<String, String> = BTreeMap::new();
    let mut taken: BTreeSet<String> = BTreeSet::new();
    for row in &rows {
        let Some(slug) = row.text("slug") else { continue };
        if let Some(name) = row.text("property_name") {
            existing.entry(name).or_insert_with(|| slug.clone());
        }
        taken.insert(slug);
    }

    let names: Vec<String> = rows.iter().filter_map(|row| row.text("property_name")).collect();
    let plan = extend_slugs(names.iter().map(String::as_str), &existing, &taken);

    let mut report = SlugReport::default();
    for row in &rows {
        let Some(id) = row.id() else { continue };
        let Some(planned) = row
            .text("property_name")
            .and_then(|name| plan.get(&name).cloned())
        else {
            report.unnamed += 1;
            continue;
        };

        match row.text("slug") {
            None => report.missing.push(PlannedFill { id, value: planned }),
            Some(current) if current != planned => {
                report.conflicts.push(SlugConflict {
                    id,
                    current,
                    planned,
                });
            }
            Some(_) => {}
        }
    }

    if apply {
        for fill in &report.missing {
            if store.fill_missing(fill.id, "slug", &fill.value).await? {
                report.written += 1;
            }
        }
    }

    Ok(report)
}

/// Infers missing countries from coordinates and, when `apply` is set,
/// writes them.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if a storage read or write fails.
pub async fn fill_missing_countries(
    store: &dyn PropertyStore,
    apply: bool,
) -> Result<CountryReport, MaintenanceError> {
    let rows = all_rows(store).await?;

    let mut report = CountryReport::default();
    for row in &rows {
        let Some(id) = row.id() else { continue };
        if let Some(current) = row.text("country") {
            if let Some(canonical) = canonical_country(&current).filter(|c| *c != current) {
                report.variant_spellings.push(CountrySpelling {
                    id,
                    current,
                    canonical,
                });
            }
            continue;
        }

        let country = from_values(row.get("lat"), row.get("lon")).and_then(infer_country);
        match country {
            Some(country) => report.inferred.push(PlannedFill {
                id,
                value: country.name().to_string(),
            }),
            None => report.unresolved += 1,
        }
    }

    if apply {
        for fill in &report.inferred {
            if store.fill_missing(fill.id, "country", &fill.value).await? {
                report.written += 1;
            }
        }
    }

    Ok(report)
}

/// Lists state values that are abbreviations or case variants of a known
/// state or province. Nothing is written: the map query already accepts
/// every variant.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if the storage read fails.
pub async fn suggest_state_names(
    store: &dyn PropertyStore,
) -> Result<Vec<StateSuggestion>, MaintenanceError> {
    let rows = all_rows(store).await?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            let id = row.id()?;
            let current = row.text("state")?;
            let canonical = canonical_state_name(&current)?;
            if current == canonical {
                return None;
            }
            let region_country = lookup_region(canonical).map(|r| r.country);
            let row_country = row.text("country").and_then(|c| Country::lookup(&c));
            Some(StateSuggestion {
                id,
                abbreviation: state_abbreviation(canonical)?,
                current,
                canonical,
                country_mismatch: row_country.is_some_and(|c| Some(c) != region_country),
            })
        })
        .collect())
}

/// Counts rows by coordinate quality.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if the storage read fails.
pub async fn audit_coordinates(
    store: &dyn PropertyStore,
) -> Result<CoordinateAudit, MaintenanceError> {
    let rows = all_rows(store).await?;

    let mut audit = CoordinateAudit {
        total: rows.len(),
        ..CoordinateAudit::default()
    };
    for row in &rows {
        let (lat, lon) = (row.get("lat"), row.get("lon"));
        if lat.is_none() || lon.is_none() {
            audit.missing += 1;
            continue;
        }
        match from_values(lat, lon) {
            None => audit.invalid += 1,
            Some(c) if in_service_area(c) => audit.valid += 1,
            Some(_) => audit.out_of_area += 1,
        }
    }

    Ok(audit)
}

/// Tallies suggestions by `(current, canonical, abbreviation)` for
/// compact output.
#[must_use]
pub fn tally_states(
    suggestions: &[StateSuggestion],
) -> BTreeMap<(String, &'static str, &'static str), usize> {
    let mut tally = BTreeMap::new();
    for s in suggestions {
        *tally
            .entry((s.current.clone(), s.canonical, s.abbreviation))
            .or_insert(0) += 1;
    }
    tally
}
