//! Supabase (`PostgREST`) property store.
//!
//! Every read is a `GET /rest/v1/{table}` with filters expressed as
//! `PostgREST` operators. Writes use `PATCH` conditioned on the column
//! still being null, so a fill never overwrites existing data.

use std::time::Duration;

use async_trait::async_trait;
use glamping_map_property_models::{CountryFilter, PropertyQuery, RawPropertyRow};
use serde_json::{Map, Value};

use crate::{PropertyStore, StoreError, validate_column};

/// Default table holding the property listings.
pub const DEFAULT_TABLE: &str = "all_glamping_properties";

/// Per-request timeout for the HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of a response body kept in a [`StoreError::Status`].
const BODY_PREVIEW_LEN: usize = 500;

/// Connection settings for a Supabase project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Table to query.
    pub table: String,
}

impl SupabaseConfig {
    /// Reads `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` (falling back to
    /// `SUPABASE_ANON_KEY`) and `PROPERTIES_TABLE`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL or both keys are missing.
    pub fn from_env() -> Result<Self, StoreError> {
        let url = non_empty_var("SUPABASE_URL").ok_or_else(|| StoreError::Config {
            message: "SUPABASE_URL is not set".to_string(),
        })?;
        let api_key = non_empty_var("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|| non_empty_var("SUPABASE_ANON_KEY"))
            .ok_or_else(|| StoreError::Config {
                message: "Neither SUPABASE_SERVICE_ROLE_KEY nor SUPABASE_ANON_KEY is set"
                    .to_string(),
            })?;
        let table = non_empty_var("PROPERTIES_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    /// REST endpoint for the configured table.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Quotes a value for use inside a `PostgREST` `in.(...)` list.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Builds an `in.("a","b")` filter.
#[must_use]
pub fn in_list<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let quoted: Vec<String> = values.into_iter().map(|v| quote(v)).collect();
    format!("in.({})", quoted.join(","))
}

/// Translates a query into `PostgREST` query-string parameters.
///
/// A [`CountryFilter::Deny`] query has no `PostgREST` form; callers
/// short-circuit it before reaching storage.
#[must_use]
pub fn query_params(query: &PropertyQuery, offset: usize, limit: usize) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "id.asc".to_string()),
    ];

    if let CountryFilter::OneOf(countries) = &query.countries {
        params.push(("country".to_string(), in_list(countries)));
    }
    for (column, values) in [
        ("state", &query.states),
        ("unit_type", &query.unit_types),
        ("rate_category", &query.rate_categories),
    ] {
        if let Some(values) = values {
            params.push((column.to_string(), in_list(values)));
        }
    }

    if query.require_coordinates {
        params.push(("lat".to_string(), "not.is.null".to_string()));
        params.push(("lon".to_string(), "not.is.null".to_string()));
    }

    let published = "or(research_status.is.null,research_status.ilike.published)";
    let open = "or(is_closed.is.null,is_closed.not.ilike.yes)";
    match (query.published_only, !query.include_closed) {
        (true, true) => params.push(("and".to_string(), format!("({published},{open})"))),
        (true, false) => params.push(("and".to_string(), format!("({published})"))),
        (false, true) => params.push(("and".to_string(), format!("({open})"))),
        (false, false) => {}
    }

    params.push(("offset".to_string(), offset.to_string()));
    params.push(("limit".to_string(), limit.to_string()));
    params
}

/// Query parameters for the first row matching `query` with the given
/// slug.
#[must_use]
pub fn slug_params(query: &PropertyQuery, slug: &str) -> Vec<(String, String)> {
    let mut params = query_params(query, 0, 1);
    params.push(("slug".to_string(), format!("eq.{slug}")));
    params
}

/// A [`PropertyStore`] talking to Supabase over HTTPS.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    /// Creates a store with a client using [`REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// The settings this store was created with.
    #[must_use]
    pub const fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
    }

    async fn rows(&self, request: reqwest::RequestBuilder) -> Result<Vec<RawPropertyRow>, StoreError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = if text.len() > BODY_PREVIEW_LEN {
                let mut end = BODY_PREVIEW_LEN;
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &text[..end])
            } else {
                text
            };
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl PropertyStore for SupabaseStore {
    async fn fetch_page(
        &self,
        query: &PropertyQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawPropertyRow>, StoreError> {
        if query.is_denied() {
            return Ok(Vec::new());
        }

        let params = query_params(query, offset, limit);
        log::debug!("Fetching {} rows at offset {offset}", self.config.table);
        self.rows(self.client.get(self.config.endpoint()).query(&params))
            .await
    }

    async fn find_by_slug(
        &self,
        query: &PropertyQuery,
        slug: &str,
    ) -> Result<Option<RawPropertyRow>, StoreError> {
        if query.is_denied() {
            return Ok(None);
        }

        let params = slug_params(query, slug);
        let rows = self
            .rows(self.client.get(self.config.endpoint()).query(&params))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fill_missing(&self, id: i64, column: &str, value: &str) -> Result<bool, StoreError> {
        validate_column(column)?;

        let params = [
            ("id".to_string(), format!("eq.{id}")),
            (column.to_string(), "is.null".to_string()),
        ];
        let mut body = Map::new();
        body.insert(column.to_string(), Value::String(value.to_string()));

        let updated = self
            .rows(
                self.client
                    .patch(self.config.endpoint())
                    .query(&params)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;

        Ok(!updated.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn public_query_params() {
        let params = query_params(&PropertyQuery::public(), 2000, 1000);
        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "order"), Some("id.asc"));
        assert_eq!(param(&params, "offset"), Some("2000"));
        assert_eq!(param(&params, "limit"), Some("1000"));
        assert_eq!(
            param(&params, "and"),
            Some(
                "(or(research_status.is.null,research_status.ilike.published),\
                 or(is_closed.is.null,is_closed.not.ilike.yes))"
            )
        );
        assert_eq!(param(&params, "country"), None);
    }

    #[test]
    fn slug_lookup_params_carry_query_filters() {
        let params = slug_params(&PropertyQuery::public(), "pine-yurts");
        assert_eq!(param(&params, "slug"), Some("eq.pine-yurts"));
        assert_eq!(param(&params, "limit"), Some("1"));
        assert_eq!(param(&params, "order"), Some("id.asc"));
        assert!(param(&params, "and").is_some_and(|v| v.contains("research_status.ilike.published")));
    }

    #[test]
    fn filters_become_in_lists() {
        let mut query = PropertyQuery::public();
        query.countries = CountryFilter::OneOf(BTreeSet::from(["CA".to_string(), "Canada".to_string()]));
        query.states = Some(BTreeSet::from(["ON".to_string()]));
        query.require_coordinates = true;

        let params = query_params(&query, 0, 1000);
        assert_eq!(param(&params, "country"), Some("in.(\"CA\",\"Canada\")"));
        assert_eq!(param(&params, "state"), Some("in.(\"ON\")"));
        assert_eq!(param(&params, "lat"), Some("not.is.null"));
        assert_eq!(param(&params, "lon"), Some("not.is.null"));
        assert_eq!(param(&params, "unit_type"), None);
    }

    #[test]
    fn maintenance_query_has_no_visibility_filter() {
        let params = query_params(&PropertyQuery::everything(), 0, 1000);
        assert_eq!(param(&params, "and"), None);
    }

    #[test]
    fn in_list_escapes_quotes_and_commas() {
        let values = BTreeSet::from(["Bob's \"Yurts\", Inc".to_string(), "a\\b".to_string()]);
        assert_eq!(
            in_list(&values),
            "in.(\"Bob's \\\"Yurts\\\", Inc\",\"a\\\\b\")"
        );
    }
}
