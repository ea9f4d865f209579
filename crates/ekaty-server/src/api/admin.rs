//! Admin restaurant management, behind bearer auth.
//!
//! - `POST   /api/v1/admin/restaurants`: create
//! - `PATCH  /api/v1/admin/restaurants/{slug}`: sparse update
//! - `DELETE /api/v1/admin/restaurants/{slug}`: soft-deactivate

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use ekaty_core::{join_labels, slug_from_name, PriceLevel};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::restaurants::RestaurantItem;
use super::{
    map_db_error, present, resolve_restaurant, ApiError, ApiResponse, AppState, ResponseMeta,
};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateRestaurantRequest {
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    pub hours: Option<serde_json::Value>,
}

// Outer None = field absent (keep), Some(None) = explicit null (clear).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRestaurantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    pub categories: Option<Vec<String>>,
    pub cuisine_types: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub price_level: Option<Option<PriceLevel>>,
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub hours: Option<Option<serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_name(req_id: &str, name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "name must be 1-200 characters",
        ));
    }
    Ok(name.to_owned())
}

fn validate_coordinates(
    req_id: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<(f64, f64)>, ApiError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
        {
            Ok(Some((lat, lng)))
        }
        (Some(_), Some(_)) => Err(ApiError::new(
            req_id,
            "validation_error",
            "latitude/longitude out of range",
        )),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "latitude and longitude must be set together",
        )),
    }
}

fn validate_rating(req_id: &str, rating: Option<f64>) -> Result<(), ApiError> {
    match rating {
        Some(r) if !(0.0..=5.0).contains(&r) => Err(ApiError::new(
            req_id,
            "validation_error",
            "rating must be between 0 and 5",
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn create_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreateRestaurantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantItem>>), ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|e| ApiError::new(rid, "validation_error", e.body_text()))?;

    let name = validate_name(rid, &body.name)?;
    let slug = slug_from_name(&name);
    if slug.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must contain at least one letter or digit",
        ));
    }
    let coordinates = validate_coordinates(rid, body.latitude, body.longitude)?;
    validate_rating(rid, body.rating)?;

    let row = ekaty_db::create_restaurant(
        &state.pool,
        &ekaty_db::NewRestaurant {
            slug,
            name,
            address: body.address,
            categories: join_labels(&body.categories),
            cuisine_types: join_labels(&body.cuisine_types),
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lng)| lng),
            price_level: body.price_level,
            rating: body.rating,
            hours: body.hours.map(|h| h.to_string()),
            featured: body.featured,
        },
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::new(rid, "conflict", "a restaurant with that slug already exists")
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;

    tracing::info!(slug = %row.slug, "restaurant created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: RestaurantItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    body: Result<Json<UpdateRestaurantRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RestaurantItem>>, ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|e| ApiError::new(rid, "validation_error", e.body_text()))?;
    let restaurant = resolve_restaurant(&state.pool, &slug, rid).await?;

    let name = body
        .name
        .as_deref()
        .map(|n| validate_name(rid, n))
        .transpose()?;

    // Coordinates move as a pair; a lone side is rejected.
    let coordinates = match (body.latitude, body.longitude) {
        (None, None) => None,
        (Some(lat), Some(lng)) => Some(validate_coordinates(rid, lat, lng)?),
        _ => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "latitude and longitude must be updated together",
            ))
        }
    };

    let update = ekaty_db::RestaurantUpdate {
        name,
        address: body.address,
        categories: body.categories.as_deref().map(join_labels),
        cuisine_types: body.cuisine_types.as_deref().map(join_labels),
        coordinates,
        price_level: body.price_level,
        featured: body.featured,
        hours: body.hours.map(|h| h.map(|v| v.to_string())),
    };

    let row = ekaty_db::update_restaurant(&state.pool, restaurant.id, &update)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(slug = %row.slug, "restaurant updated");

    Ok(Json(ApiResponse {
        data: RestaurantItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn deactivate_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let restaurant = resolve_restaurant(&state.pool, &slug, rid).await?;

    ekaty_db::deactivate_restaurant(&state.pool, restaurant.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(slug = %slug, "restaurant deactivated");

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deactivated": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
