//! Read paths built on top of [`PropertyStore`].
//!
//! Storage is always read in sequential pages of [`PAGE_SIZE`] rows,
//! concatenated in fetch order.

use glamping_map_geo::bounds::filter_by_bounds;
use glamping_map_geo::coordinates::in_service_area;
use glamping_map_geo::nearby::{NearbyOptions, rank_nearby};
use glamping_map_property_models::{
    BoundingBox, Coordinates, NearbyProperty, PropertyQuery, PropertyRecord, RawPropertyRow,
};

use crate::retry::{RetryPolicy, with_retry};
use crate::rows::{to_record, to_records};
use crate::{PropertyStore, StoreError};

/// Rows requested per storage round trip.
pub const PAGE_SIZE: usize = 1000;

/// Maximum number of candidates considered by a nearby search.
pub const NEARBY_CANDIDATE_CAP: usize = 5000;

/// Fetches every row matching `query`, one page at a time.
///
/// Stops at the first short page, or once `cap` rows have been read.
/// A denied query returns no rows without touching storage.
///
/// # Errors
///
/// Returns the first [`StoreError`] raised by a page fetch.
pub async fn fetch_rows(
    store: &dyn PropertyStore,
    query: &PropertyQuery,
    cap: Option<usize>,
) -> Result<Vec<RawPropertyRow>, StoreError> {
    if query.is_denied() {
        log::debug!("Country filter denies everything, skipping storage");
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    loop {
        let limit = cap.map_or(PAGE_SIZE, |cap| PAGE_SIZE.min(cap.saturating_sub(rows.len())));
        if limit == 0 {
            break;
        }

        let page = store.fetch_page(query, rows.len(), limit).await?;
        let short = page.len() < limit;
        rows.extend(page);
        if short {
            break;
        }
    }

    if let Some(cap) = cap {
        rows.truncate(cap);
    }

    log::debug!("Fetched {} property rows", rows.len());
    Ok(rows)
}

/// Fetches and converts every record matching `query`.
///
/// # Errors
///
/// Returns the first [`StoreError`] raised by a page fetch.
pub async fn fetch_properties(
    store: &dyn PropertyStore,
    query: &PropertyQuery,
) -> Result<Vec<PropertyRecord>, StoreError> {
    Ok(to_records(fetch_rows(store, query, None).await?))
}

/// Records for the map: valid coordinates inside the service area,
/// optionally restricted to a viewport.
///
/// # Errors
///
/// Returns the first [`StoreError`] raised by a page fetch.
pub async fn map_properties(
    store: &dyn PropertyStore,
    query: &PropertyQuery,
    bounds: Option<&BoundingBox>,
) -> Result<Vec<PropertyRecord>, StoreError> {
    let located: Vec<PropertyRecord> = fetch_properties(store, query)
        .await?
        .into_iter()
        .filter(|p| p.coordinates.is_some_and(in_service_area))
        .collect();

    Ok(filter_by_bounds(located, bounds, |p| p.coordinates))
}

/// Storage query for the property detail read: publicly visible rows,
/// closed or not.
#[must_use]
pub const fn detail_query() -> PropertyQuery {
    let mut query = PropertyQuery::public();
    query.include_closed = true;
    query
}

/// Looks up a publicly visible record by slug.
///
/// The publication filter is applied by the store, so an unpublished row
/// never hides a published one sharing its slug.
///
/// # Errors
///
/// Returns [`StoreError`] if the storage request fails.
pub async fn find_property(
    store: &dyn PropertyStore,
    slug: &str,
) -> Result<Option<PropertyRecord>, StoreError> {
    Ok(store
        .find_by_slug(&detail_query(), slug)
        .await?
        .as_ref()
        .and_then(to_record))
}

/// Properties near `origin`, closest first.
///
/// Candidates are the first [`NEARBY_CANDIDATE_CAP`] public rows with
/// coordinates. Transient storage failures are retried per `policy`; if
/// the fetch still fails the result is empty and the failure is only
/// logged.
pub async fn nearby_properties(
    store: &dyn PropertyStore,
    origin: Coordinates,
    exclude_slug: Option<&str>,
    options: NearbyOptions,
    policy: RetryPolicy,
) -> Vec<NearbyProperty> {
    let mut query = PropertyQuery::public();
    query.require_coordinates = true;

    let candidates = with_retry(policy, "nearby candidates", || {
        fetch_rows(store, &query, Some(NEARBY_CANDIDATE_CAP))
    })
    .await;

    match candidates {
        Ok(rows) => rank_nearby(origin, exclude_slug, to_records(rows), options),
        Err(e) => {
            log::warn!("Nearby properties unavailable: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use glamping_map_geo::normalize::{expand_countries, expand_states};
    use glamping_map_property_models::CountryFilter;
    use serde_json::{Value, json};

    use super::*;
    use crate::memory::MemoryStore;

    fn row(value: Value) -> RawPropertyRow {
        serde_json::from_value(value).unwrap()
    }

    fn ids(records: &[PropertyRecord]) -> Vec<i64> {
        records.iter().map(|p| p.id).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    /// Wraps a store and fails the first `failures` page fetches.
    struct FlakyStore {
        inner: MemoryStore,
        failures: usize,
        status: u16,
        calls: AtomicUsize,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore, failures: usize, status: u16) -> Self {
            Self {
                inner,
                failures,
                status,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PropertyStore for FlakyStore {
        async fn fetch_page(
            &self,
            query: &PropertyQuery,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<RawPropertyRow>, StoreError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(StoreError::Status {
                    status: self.status,
                    body: String::new(),
                });
            }
            self.inner.fetch_page(query, offset, limit).await
        }

        async fn find_by_slug(
            &self,
            query: &PropertyQuery,
            slug: &str,
        ) -> Result<Option<RawPropertyRow>, StoreError> {
            self.inner.find_by_slug(query, slug).await
        }

        async fn fill_missing(&self, id: i64, column: &str, value: &str) -> Result<bool, StoreError> {
            self.inner.fill_missing(id, column, value).await
        }
    }

    fn located(count: i64) -> MemoryStore {
        MemoryStore::new(
            (1..=count)
                .map(|id| row(json!({"id": id, "slug": format!("p-{id}"), "lat": 40.0, "lon": -105.0})))
                .collect(),
        )
    }

    #[tokio::test]
    async fn paginates_in_fetch_order() {
        let store = located(2500);
        let rows = fetch_rows(&store, &PropertyQuery::public(), None).await.unwrap();
        assert_eq!(rows.len(), 2500);
        assert_eq!(rows.first().and_then(RawPropertyRow::id), Some(1));
        assert_eq!(rows.last().and_then(RawPropertyRow::id), Some(2500));
    }

    #[tokio::test]
    async fn cap_limits_rows_read() {
        let store = located(2500);
        let rows = fetch_rows(&store, &PropertyQuery::public(), Some(1500))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1500);
    }

    #[tokio::test]
    async fn zero_countries_returns_nothing() {
        let store = located(10);
        let mut query = PropertyQuery::public();
        query.countries = expand_countries(&[]);
        assert_eq!(query.countries, CountryFilter::Deny);
        assert!(map_properties(&store, &query, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn state_variants_match_across_countries() {
        let store = MemoryStore::new(vec![
            row(json!({"id": 1, "state": "California", "country": "USA", "lat": 36.7, "lon": -119.4})),
            row(json!({"id": 2, "state": "CA", "country": "Canada", "lat": 49.2, "lon": -123.1})),
            row(json!({"id": 3, "state": "CO", "country": "USA", "lat": 39.7, "lon": -105.0})),
        ]);

        let mut query = PropertyQuery::public();
        query.states = expand_states(&strings(&["CA"]));
        let found = map_properties(&store, &query, None).await.unwrap();
        assert_eq!(ids(&found), vec![1, 2]);

        query.states = expand_states(&strings(&["California"]));
        let found = map_properties(&store, &query, None).await.unwrap();
        assert_eq!(ids(&found), vec![1, 2]);
    }

    #[tokio::test]
    async fn map_excludes_invalid_and_out_of_area_coordinates() {
        let store = MemoryStore::new(vec![
            row(json!({"id": 1, "lat": "45.5", "lon": "-122.6"})),
            row(json!({"id": 2, "lat": 91, "lon": 0})),
            row(json!({"id": 3, "lat": 48.8, "lon": 2.3})),
            row(json!({"id": 4})),
        ]);

        let found = map_properties(&store, &PropertyQuery::public(), None).await.unwrap();
        assert_eq!(ids(&found), vec![1]);

        // Non-geospatial reads still see every row.
        let all = fetch_properties(&store, &PropertyQuery::public()).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn map_applies_bounds() {
        let store = MemoryStore::new(vec![
            row(json!({"id": 1, "lat": 40.0, "lon": -105.0})),
            row(json!({"id": 2, "lat": 45.5, "lon": -122.6})),
        ]);
        let bounds = BoundingBox::new(42.0, 38.0, -100.0, -110.0);
        let found = map_properties(&store, &PropertyQuery::public(), Some(&bounds))
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[tokio::test]
    async fn find_property_hides_unpublished() {
        let store = MemoryStore::new(vec![
            row(json!({"id": 1, "slug": "draft", "research_status": "needs_review"})),
            row(json!({"id": 2, "slug": "live", "research_status": "published"})),
            row(json!({"id": 3, "slug": "legacy"})),
        ]);
        assert!(find_property(&store, "draft").await.unwrap().is_none());
        assert_eq!(find_property(&store, "live").await.unwrap().map(|p| p.id), Some(2));
        assert_eq!(find_property(&store, "legacy").await.unwrap().map(|p| p.id), Some(3));
        assert!(find_property(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_property_skips_unpublished_slug_twin() {
        let store = MemoryStore::new(vec![
            row(json!({"id": 1, "slug": "pine-yurts", "research_status": "rejected"})),
            row(json!({"id": 2, "slug": "pine-yurts", "research_status": "published"})),
            row(json!({"id": 3, "slug": "shut", "is_closed": "Yes"})),
        ]);
        assert_eq!(find_property(&store, "pine-yurts").await.unwrap().map(|p| p.id), Some(2));
        assert_eq!(find_property(&store, "shut").await.unwrap().map(|p| p.id), Some(3));
    }

    /// Ignores `limit` and always returns a fixed batch.
    struct OverfullStore {
        batch: Vec<RawPropertyRow>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PropertyStore for OverfullStore {
        async fn fetch_page(
            &self,
            _query: &PropertyQuery,
            _offset: usize,
            _limit: usize,
        ) -> Result<Vec<RawPropertyRow>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.batch.clone())
        }

        async fn find_by_slug(
            &self,
            _query: &PropertyQuery,
            _slug: &str,
        ) -> Result<Option<RawPropertyRow>, StoreError> {
            Ok(None)
        }

        async fn fill_missing(&self, _id: i64, _column: &str, _value: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn cap_tolerates_oversized_pages() {
        let store = OverfullStore {
            batch: (1..=1200).map(|id| row(json!({"id": id}))).collect(),
            calls: AtomicUsize::new(0),
        };
        let rows = fetch_rows(&store, &PropertyQuery::public(), Some(1500))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1500);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn nearby_retries_transient_failures() {
        let store = FlakyStore::new(located(3), 2, 503);
        let nearby = nearby_properties(
            &store,
            Coordinates::new(40.0, -105.0),
            Some("p-1"),
            NearbyOptions::default(),
            RetryPolicy::immediate(),
        )
        .await;
        assert_eq!(nearby.len(), 2);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn nearby_is_empty_after_exhausting_retries() {
        let store = FlakyStore::new(located(3), 100, 503);
        let nearby = nearby_properties(
            &store,
            Coordinates::new(40.0, -105.0),
            None,
            NearbyOptions::default(),
            RetryPolicy::immediate(),
        )
        .await;
        assert!(nearby.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn nearby_does_not_retry_fatal_errors() {
        let store = FlakyStore::new(located(3), 1, 401);
        let nearby = nearby_properties(
            &store,
            Coordinates::new(40.0, -105.0),
            None,
            NearbyOptions::default(),
            RetryPolicy::immediate(),
        )
        .await;
        assert!(nearby.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
