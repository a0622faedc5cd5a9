//! HTTP handler functions for the glamping map API.

use std::collections::BTreeMap;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use glamping_map_content::glossary::{GlossaryCategory, GlossaryTerm, group_by_letter};
use glamping_map_content::sitemap::Sitemap;
use glamping_map_database::queries;
use glamping_map_geo::nearby::NearbyOptions;
use glamping_map_geo::normalize::{expand_countries, expand_exact, expand_states};
use glamping_map_property_models::PropertyQuery;
use glamping_map_server_models::projection::{project, to_api_property};
use glamping_map_server_models::{
    ApiError, ApiHealth, ApiItem, ApiList, ApiNearbyProperty, GlossaryParams,
    PropertyDetailResponse, PropertyQueryParams, RevalidateParams, RevalidateResponse,
};

use crate::AppState;
use crate::cache::PROPERTIES_TAG;

/// `Cache-Control` for property listings: edge-cached for a year, served
/// stale for a day while revalidating.
pub const PROPERTIES_CACHE_CONTROL: &str = "public, s-maxage=31536000, stale-while-revalidate=86400";

/// Header carrying the revalidation secret.
pub const REVALIDATE_TOKEN_HEADER: &str = "x-revalidate-token";

/// Translates request parameters into a storage query.
fn storage_query(params: &PropertyQueryParams) -> PropertyQuery {
    let mut query = PropertyQuery::public();
    query.countries = expand_countries(&params.countries);
    query.states = expand_states(&params.states);
    query.unit_types = expand_exact(&params.unit_types);
    query.rate_categories = expand_exact(&params.rate_ranges);
    query
}

fn properties_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((header::CACHE_CONTROL, PROPERTIES_CACHE_CONTROL))
        .body(body)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/properties`
///
/// Map listing filtered by country, state, unit type and rate range,
/// optionally restricted to a viewport and projected to a field list.
pub async fn properties(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> HttpResponse {
    let params = PropertyQueryParams::from_pairs(&query);
    let key = format!("{PROPERTIES_TAG}:{}", params.cache_key());

    if let Some(body) = state.cache.get(&key) {
        log::debug!("Cache hit for {key}");
        return properties_response(body);
    }

    let filter = storage_query(&params);
    let records =
        match queries::map_properties(state.store.as_ref(), &filter, params.bounds.as_ref()).await {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to fetch properties: {e}");
                return HttpResponse::InternalServerError()
                    .json(ApiError::new("Failed to fetch properties", e.to_string()));
            }
        };

    let data: Vec<_> = records
        .iter()
        .map(|record| project(to_api_property(record), params.fields.as_deref()))
        .collect();

    let body = match serde_json::to_string(&ApiList::new(data)) {
        Ok(body) => body,
        Err(e) => {
            log::error!("Failed to serialize properties: {e}");
            return HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to fetch properties", e.to_string()));
        }
    };

    state.cache.put(key, body.clone(), &[PROPERTIES_TAG]);
    properties_response(body)
}

/// `GET /api/properties/{slug}`
///
/// One published property with the closest other properties.
pub async fn property_detail(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let slug = path.into_inner();

    let record = match queries::find_property(state.store.as_ref(), &slug).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return HttpResponse::NotFound().json(ApiError::new(
                "not_found",
                format!("No published property with slug '{slug}'"),
            ));
        }
        Err(e) => {
            log::error!("Failed to fetch property {slug}: {e}");
            return HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to fetch property", e.to_string()));
        }
    };

    let nearby = match record.coordinates {
        Some(origin) => {
            queries::nearby_properties(
                state.store.as_ref(),
                origin,
                Some(&slug),
                NearbyOptions::default(),
                state.retry,
            )
            .await
        }
        None => Vec::new(),
    };

    HttpResponse::Ok().json(PropertyDetailResponse {
        success: true,
        data: to_api_property(&record),
        nearby: nearby
            .iter()
            .map(|n| ApiNearbyProperty {
                property: to_api_property(&n.property),
                distance_miles: n.distance_miles,
            })
            .collect(),
    })
}

/// `GET /api/glossary`
///
/// Terms grouped by first letter, optionally limited to one category.
pub async fn glossary(state: web::Data<AppState>, params: web::Query<GlossaryParams>) -> HttpResponse {
    let by_letter = match params.category.as_deref() {
        Some(category) => match category.parse::<GlossaryCategory>() {
            Ok(category) => group_by_letter(state.glossary.in_category(category)),
            Err(_) => {
                return HttpResponse::BadRequest().json(ApiError::new(
                    "invalid_category",
                    format!("Unknown glossary category '{category}'"),
                ));
            }
        },
        None => state.glossary.by_letter(),
    };

    let grouped: BTreeMap<String, Vec<&GlossaryTerm>> = by_letter
        .into_iter()
        .map(|(letter, terms)| (letter.to_string(), terms))
        .collect();

    HttpResponse::Ok().json(ApiItem::new(grouped))
}

/// `GET /api/glossary/{slug}`
pub async fn glossary_term(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let slug = path.into_inner();
    match state.glossary.find(&slug) {
        Some(term) => HttpResponse::Ok().json(ApiItem::new(term)),
        None => HttpResponse::NotFound().json(ApiError::new(
            "not_found",
            format!("No glossary term with slug '{slug}'"),
        )),
    }
}

/// `GET /sitemap.xml`
pub async fn sitemap(state: web::Data<AppState>) -> HttpResponse {
    let records = match queries::fetch_properties(state.store.as_ref(), &PropertyQuery::public()).await {
        Ok(records) => records,
        Err(e) => {
            log::error!("Failed to build sitemap: {e}");
            return HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to build sitemap", e.to_string()));
        }
    };

    let sitemap = Sitemap::build(&state.config.site_url, &records, &state.glossary);
    log::debug!("Built sitemap with {} URLs", sitemap.urls().len());
    HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(sitemap.to_xml())
}

/// `POST /api/revalidate[?tag=...]`
///
/// Purges cached responses carrying `tag`, or every cached response when
/// no tag is given. Requires the configured revalidation token.
pub async fn revalidate(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<RevalidateParams>,
) -> HttpResponse {
    let Some(expected) = state.config.revalidate_token.as_deref() else {
        return HttpResponse::NotFound().json(ApiError::new(
            "not_found",
            "Revalidation is not enabled",
        ));
    };

    let provided = req
        .headers()
        .get(REVALIDATE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    let tag = params.into_inner().tag;
    if provided != Some(expected) {
        log::warn!("Rejected revalidation request for tag {tag:?}");
        return HttpResponse::Unauthorized().json(ApiError::new(
            "unauthorized",
            "Missing or invalid revalidation token",
        ));
    }

    let purged = match tag.as_deref() {
        Some(tag) => state.cache.invalidate_tag(tag),
        None => state.cache.clear(),
    };
    log::info!(
        "Revalidated {tag:?}: purged {purged} entries, {} remain",
        state.cache.len()
    );

    HttpResponse::Ok().json(RevalidateResponse {
        success: true,
        tag,
        purged,
    })
}
