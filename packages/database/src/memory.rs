//! In-process property store.
//!
//! Serves a fixed set of rows with the same filter semantics as the
//! `PostgREST` query built by [`crate::supabase`]. Used by tests and for
//! running the server against a local JSON fixture.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use glamping_map_property_models::{CountryFilter, PropertyQuery, RawPropertyRow};
use serde_json::Value;

use crate::{PropertyStore, StoreError, validate_column};

/// A [`PropertyStore`] backed by a vector of rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<RawPropertyRow>>,
}

impl MemoryStore {
    /// Creates a store holding `rows`, ordered by ascending `id`.
    #[must_use]
    pub fn new(mut rows: Vec<RawPropertyRow>) -> Self {
        rows.sort_by_key(|row| row.id().unwrap_or(i64::MAX));
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Loads rows from a JSON file containing an array of objects.
    ///
    /// # Errors
    ///
    /// * [`StoreError::Io`] if the file cannot be read
    /// * [`StoreError::Fixture`] if it is not an array of objects
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let rows: Vec<RawPropertyRow> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Fixture {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded {} property rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }

    /// Returns a copy of every row.
    #[must_use]
    pub fn rows(&self) -> Vec<RawPropertyRow> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn in_set(row: &RawPropertyRow, column: &str, accepted: Option<&BTreeSet<String>>) -> bool {
    accepted.is_none_or(|accepted| row.text(column).is_some_and(|value| accepted.contains(&value)))
}

/// Whether `row` satisfies `query`.
#[must_use]
pub fn matches(query: &PropertyQuery, row: &RawPropertyRow) -> bool {
    let country_ok = match &query.countries {
        CountryFilter::Deny => false,
        CountryFilter::Any => true,
        CountryFilter::OneOf(accepted) => in_set(row, "country", Some(accepted)),
    };
    if !country_ok
        || !in_set(row, "state", query.states.as_ref())
        || !in_set(row, "unit_type", query.unit_types.as_ref())
        || !in_set(row, "rate_category", query.rate_categories.as_ref())
    {
        return false;
    }

    if query.require_coordinates && (row.get("lat").is_none() || row.get("lon").is_none()) {
        return false;
    }

    if query.published_only
        && row
            .text("research_status")
            .is_some_and(|status| !status.eq_ignore_ascii_case("published"))
    {
        return false;
    }

    if !query.include_closed
        && row
            .text("is_closed")
            .is_some_and(|closed| closed.eq_ignore_ascii_case("yes"))
    {
        return false;
    }

    true
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn fetch_page(
        &self,
        query: &PropertyQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawPropertyRow>, StoreError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows
            .iter()
            .filter(|row| matches(query, row))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_slug(
        &self,
        query: &PropertyQuery,
        slug: &str,
    ) -> Result<Option<RawPropertyRow>, StoreError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows
            .iter()
            .find(|row| row.text("slug").as_deref() == Some(slug) && matches(query, row))
            .cloned())
    }

    async fn fill_missing(&self, id: i64, column: &str, value: &str) -> Result<bool, StoreError> {
        validate_column(column)?;

        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let Some(row) = rows.iter_mut().find(|row| row.id() == Some(id)) else {
            return Ok(false);
        };
        if row.get(column).is_some() {
            return Ok(false);
        }

        row.0
            .insert(column.to_string(), Value::String(value.to_string()));
        Ok(true)
    }
}
