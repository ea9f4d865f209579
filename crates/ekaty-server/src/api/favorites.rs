//! Favorites: a user's saved restaurants.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct FavoritesQuery {
    pub user_id: Option<String>,
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddFavoriteRequest {
    pub user_id: Option<String>,
    pub restaurant_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteItem {
    id: Uuid,
    user_id: String,
    restaurant_id: Uuid,
    restaurant_name: String,
    restaurant_slug: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ekaty_db::FavoriteRow> for FavoriteItem {
    fn from(row: ekaty_db::FavoriteRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            restaurant_id: row.restaurant_id,
            restaurant_name: row.restaurant_name,
            restaurant_slug: row.restaurant_slug,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

fn required_user_id(request_id: &str, user_id: Option<String>) -> Result<String, ApiError> {
    user_id
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(request_id, "bad_request", "user_id is required"))
}

pub(super) async fn list_favorites(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<ApiResponse<Vec<FavoriteItem>>>, ApiError> {
    let user_id = required_user_id(&req_id.0, query.user_id)?;

    let rows = ekaty_db::list_favorites_for_user(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(FavoriteItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn add_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteItem>>), ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|e| ApiError::new(rid, "bad_request", e.body_text()))?;

    let user_id = required_user_id(rid, body.user_id)?;
    let restaurant_id = body
        .restaurant_id
        .ok_or_else(|| ApiError::new(rid, "bad_request", "restaurantId is required"))?;

    let exists = ekaty_db::get_restaurant_by_id(&state.pool, restaurant_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .is_some();
    if !exists {
        return Err(ApiError::new(rid, "not_found", "restaurant not found"));
    }

    let notes = body
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let row = ekaty_db::add_favorite(&state.pool, &user_id, restaurant_id, notes)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::new(rid, "conflict", "restaurant already in favorites")
            } else {
                map_db_error(rid.clone(), &e)
            }
        })?;

    tracing::info!(user_id = %user_id, restaurant_id = %restaurant_id, "favorite added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: FavoriteItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let user_id = required_user_id(rid, query.user_id)?;
    let restaurant_id = query
        .restaurant_id
        .ok_or_else(|| ApiError::new(rid, "bad_request", "restaurant_id is required"))?;

    let removed = ekaty_db::remove_favorite(&state.pool, &user_id, restaurant_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(ApiError::new(rid, "not_found", "favorite not found"));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "removed": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
