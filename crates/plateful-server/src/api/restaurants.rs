//! Read and maintenance handlers for the restaurant collection.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use plateful_core::geo::{filter_within_radius, GeoPoint};
use plateful_core::page::{page_count, paginate};
use plateful_core::Restaurant;
use plateful_db::FilterParams;

use super::{map_db_error, normalize_limit, ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PagedRestaurants {
    pub restaurants: Vec<Restaurant>,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyResponse {
    pub total_results: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub restaurants: Vec<Restaurant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FilteredRestaurants {
    pub restaurants: Vec<Restaurant>,
    pub pages: i64,
    pub total_restaurants: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse {
    pub message: String,
}

/// Treat an absent or empty query string value as "criterion not applied".
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn offset_for(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit)
}

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    search: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

pub(super) async fn list_restaurants(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedRestaurants>, ApiError> {
    let page = params.page.unwrap_or(1);
    let limit = normalize_limit(params.limit, 10);
    let search = non_empty(params.search.as_deref());

    let restaurants =
        plateful_db::search_by_name(&state.pool, search, limit, offset_for(page, limit))
            .await
            .map_err(|e| map_db_error(&e))?;
    let total = plateful_db::count_by_name(&state.pool, search)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(PagedRestaurants {
        restaurants,
        total_pages: page_count(total, limit),
        current_page: page,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct NearbyParams {
    lat: Option<String>,
    lng: Option<String>,
    range: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

pub(super) async fn nearby_restaurants(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let (Some(lat), Some(lng), Some(range)) = (
        non_empty(params.lat.as_deref()),
        non_empty(params.lng.as_deref()),
        non_empty(params.range.as_deref()),
    ) else {
        return Err(ApiError::new("validation_error", "Missing required parameters"));
    };

    let (Ok(lat), Ok(lng), Ok(range)) = (
        lat.parse::<f64>(),
        lng.parse::<f64>(),
        range.parse::<f64>(),
    ) else {
        return Err(ApiError::new(
            "validation_error",
            "lat, lng and range must be numeric",
        ));
    };

    let page = params.page.unwrap_or(1);
    let limit = normalize_limit(params.limit, 15);

    // Full-table candidate scan, bounded by the configured timeout. The
    // geospatial predicate is applied in memory, not pushed to the store.
    let candidates = tokio::time::timeout(
        state.nearby_scan_timeout,
        plateful_db::fetch_all(&state.pool),
    )
    .await
    .map_err(|_| {
        tracing::error!("nearby candidate scan exceeded its timeout");
        ApiError::new("internal_error", "nearby scan timed out")
    })?
    .map_err(|e| map_db_error(&e))?;

    let within = filter_within_radius(candidates, GeoPoint { lat, lng }, range);
    let page_data = paginate(within, page, limit);

    Ok(Json(NearbyResponse {
        total_results: page_data.total_results,
        total_pages: page_data.total_pages,
        current_page: page_data.current_page,
        restaurants: page_data.items,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct TopParams {
    city: Option<String>,
}

const TOP_OVERALL: i64 = 100;
const TOP_PER_CITY: i64 = 30;

pub(super) async fn top_restaurants(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let city = non_empty(params.city.as_deref());
    let count = if city.is_some() { TOP_PER_CITY } else { TOP_OVERALL };

    let top = plateful_db::top_rated(&state.pool, city, count)
        .await
        .map_err(|e| map_db_error(&e))?;

    if top.is_empty() {
        let message = if city.is_some() {
            "No restaurants found in this city"
        } else {
            "No restaurants found"
        };
        return Err(ApiError::new("not_found", message));
    }

    Ok(Json(top))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FilterQuery {
    name: Option<String>,
    country: Option<String>,
    cuisines: Option<String>,
    min_avg_cost: Option<i32>,
    max_avg_cost: Option<i32>,
    page: Option<i64>,
    limit: Option<i64>,
}

pub(super) async fn filter_restaurants(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<FilteredRestaurants>, ApiError> {
    let page = params.page.unwrap_or(1);
    let limit = normalize_limit(params.limit, 5);

    let filter = FilterParams {
        name: non_empty(params.name.as_deref()),
        country: non_empty(params.country.as_deref()),
        cuisines: non_empty(params.cuisines.as_deref()),
        min_avg_cost: params.min_avg_cost,
        max_avg_cost: params.max_avg_cost,
    };

    let restaurants =
        plateful_db::list_filtered(&state.pool, filter, limit, offset_for(page, limit))
            .await
            .map_err(|e| map_db_error(&e))?;
    let total = plateful_db::count_filtered(&state.pool, filter)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(FilteredRestaurants {
        restaurants,
        pages: page_count(total, limit),
        total_restaurants: total,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct CityParams {
    city: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

pub(super) async fn restaurants_by_city(
    State(state): State<AppState>,
    Query(params): Query<CityParams>,
) -> Result<Json<PagedRestaurants>, ApiError> {
    let Some(city) = non_empty(params.city.as_deref()) else {
        return Err(ApiError::new(
            "validation_error",
            "Please provide a city name",
        ));
    };

    let page = params.page.unwrap_or(1);
    let limit = normalize_limit(params.limit, 30);

    let restaurants =
        plateful_db::list_by_city(&state.pool, city, limit, offset_for(page, limit))
            .await
            .map_err(|e| map_db_error(&e))?;
    let total = plateful_db::count_by_city(&state.pool, city)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(PagedRestaurants {
        restaurants,
        total_pages: page_count(total, limit),
        current_page: page,
    }))
}

pub(super) async fn restaurant_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, ApiError> {
    let restaurant = plateful_db::get_by_external_id(&state.pool, &id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::new("not_found", "Restaurant not found"))?;

    Ok(Json(restaurant))
}

pub(super) async fn delete_duplicates(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = plateful_db::delete_duplicates_by_name(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    tracing::info!(deleted, "duplicate restaurant purge completed");

    Ok(Json(MessageResponse {
        message: "Duplicate documents removed successfully".to_owned(),
    }))
}
