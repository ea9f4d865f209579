//! Restaurant directory endpoints.
//!
//! - `GET /api/v1/restaurants`: filtered listing, featured first
//! - `GET /api/v1/restaurants/map`: active restaurants with coordinates
//! - `GET /api/v1/restaurants/{slug}`: one active restaurant

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use ekaty_core::{PriceLevel, Restaurant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, resolve_restaurant, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

/// Public shape of a restaurant: label lists split, hours parsed.
#[derive(Debug, Serialize)]
pub(super) struct RestaurantItem {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: Option<String>,
    pub categories: Vec<String>,
    pub cuisine_types: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub favorite_count: i64,
    pub featured: bool,
    pub hours: serde_json::Value,
}

impl From<&Restaurant> for RestaurantItem {
    fn from(r: &Restaurant) -> Self {
        Self {
            id: r.id,
            slug: r.slug.clone(),
            name: r.name.clone(),
            address: r.address.clone(),
            categories: r.category_list(),
            cuisine_types: r.cuisine_type_list(),
            latitude: r.latitude,
            longitude: r.longitude,
            price_level: r.price_level,
            rating: r.rating,
            review_count: r.review_count,
            favorite_count: r.favorite_count,
            featured: r.featured,
            hours: r.hours_json(),
        }
    }
}

impl From<ekaty_db::RestaurantRow> for RestaurantItem {
    fn from(row: ekaty_db::RestaurantRow) -> Self {
        Self::from(&row.into_restaurant())
    }
}

/// Map marker for a restaurant with known coordinates.
#[derive(Debug, Serialize)]
pub(super) struct MapPin {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
    pub cuisine_types: Vec<String>,
    pub price_level: Option<PriceLevel>,
}

#[derive(Debug, Serialize)]
pub(super) struct MapPins {
    pub restaurants: Vec<MapPin>,
    pub count: usize,
}

impl MapPin {
    fn from_restaurant(r: &Restaurant) -> Option<Self> {
        let location = r.location()?;
        Some(Self {
            id: r.id,
            slug: r.slug.clone(),
            name: r.name.clone(),
            address: r.address.clone(),
            latitude: location.lat,
            longitude: location.lng,
            rating: r.rating,
            cuisine_types: r.cuisine_type_list(),
            price_level: r.price_level,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RestaurantListQuery {
    pub search: Option<String>,
    /// Comma-separated.
    pub categories: Option<String>,
    /// Comma-separated; names or `$`..`$$$$`.
    pub price_level: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub(super) async fn list_restaurants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RestaurantListQuery>,
) -> Result<Json<ApiResponse<Vec<RestaurantItem>>>, ApiError> {
    let rid = &req_id.0;

    let price_levels = split_csv(query.price_level.as_deref())
        .iter()
        .map(|p| p.parse::<PriceLevel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);

    let rows = ekaty_db::search_restaurants(
        &state.pool,
        &ekaty_db::RestaurantQuery {
            search,
            categories: split_csv(query.categories.as_deref()),
            price_levels,
            featured: query.featured,
            limit: normalize_limit(query.limit),
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(RestaurantItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_map_pins(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<MapPins>>, ApiError> {
    let rows = ekaty_db::list_mappable_restaurants(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let restaurants: Vec<MapPin> = rows
        .into_iter()
        .filter_map(|row| MapPin::from_restaurant(&row.into_restaurant()))
        .collect();

    Ok(Json(ApiResponse {
        data: MapPins {
            count: restaurants.len(),
            restaurants,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<RestaurantItem>>, ApiError> {
    let row = resolve_restaurant(&state.pool, &slug, &req_id.0).await?;

    Ok(Json(ApiResponse {
        data: RestaurantItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{app, get_json, seed_restaurant};
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empties() {
        assert_eq!(split_csv(Some(" BBQ, ,Pizza ")), vec!["BBQ", "Pizza"]);
        assert!(split_csv(None).is_empty());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_puts_featured_first(pool: sqlx::PgPool) {
        seed_restaurant(&pool, "Plain Pizza", "Pizza", false).await;
        seed_restaurant(&pool, "Star Pizza", "Pizza,Italian", true).await;
        seed_restaurant(&pool, "Pho Place", "Vietnamese", false).await;

        let (status, json) = get_json(app(pool), "/api/v1/restaurants?categories=Pizza").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        let slugs: Vec<&str> = data.iter().filter_map(|r| r["slug"].as_str()).collect();
        assert_eq!(slugs, vec!["star-pizza", "plain-pizza"]);
        assert_eq!(data[0]["categories"][1], "Italian");
        assert_eq!(data[0]["price_level"], "MODERATE");
        assert!(data[0]["hours"].is_object());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_rejects_unknown_price_level(pool: sqlx::PgPool) {
        let (status, json) = get_json(app(pool), "/api/v1/restaurants?price_level=CHEAP").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn map_lists_placed_restaurants_by_name(pool: sqlx::PgPool) {
        seed_restaurant(&pool, "Zoes Kitchen", "Mediterranean", false).await;
        seed_restaurant(&pool, "Amici", "Italian", true).await;
        let unplaced = seed_restaurant(&pool, "Food Truck", "Tacos", false).await;
        sqlx::query("UPDATE restaurants SET latitude = NULL, longitude = NULL WHERE id = $1")
            .bind(unplaced)
            .execute(&pool)
            .await
            .expect("clear coordinates");

        let (status, json) = get_json(app(pool), "/api/v1/restaurants/map").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], 2);
        let pins = json["data"]["restaurants"].as_array().expect("pins");
        let slugs: Vec<&str> = pins.iter().filter_map(|p| p["slug"].as_str()).collect();
        assert_eq!(slugs, vec!["amici", "zoes-kitchen"]);
        assert!(pins[0]["latitude"].is_f64());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_returns_404_for_unknown_slug(pool: sqlx::PgPool) {
        let (status, json) = get_json(app(pool), "/api/v1/restaurants/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_returns_restaurant_by_slug(pool: sqlx::PgPool) {
        seed_restaurant(&pool, "Katy Donuts", "Donuts,Breakfast", false).await;

        let (status, json) = get_json(app(pool), "/api/v1/restaurants/katy-donuts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Katy Donuts");
        assert_eq!(json["data"]["review_count"], 0);
    }
}
