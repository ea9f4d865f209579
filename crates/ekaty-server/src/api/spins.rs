use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_RECENT_LIMIT: i64 = 10;
const UNKNOWN_RESTAURANT: &str = "Unknown Restaurant";

#[derive(Debug, Deserialize)]
pub(super) struct RecentSpinsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecentSpinItem {
    id: i64,
    restaurant_name: String,
    created_at: DateTime<Utc>,
}

pub(super) async fn list_recent_spins(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentSpinsQuery>,
) -> Result<Json<ApiResponse<Vec<RecentSpinItem>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 200);
    let rows = ekaty_db::list_recent_spins(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| RecentSpinItem {
            id: row.id,
            restaurant_name: row
                .restaurant_name
                .unwrap_or_else(|| UNKNOWN_RESTAURANT.to_string()),
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::super::test_support::{app, get_json, seed_restaurant, send_json};

    #[sqlx::test(migrations = "../../migrations")]
    async fn recent_spins_default_to_ten_newest(pool: sqlx::PgPool) {
        seed_restaurant(&pool, "Spin Target", "Pizza", false).await;
        let router = app(pool);
        for _ in 0..12 {
            let (status, _) =
                send_json(router.clone(), Method::POST, "/api/v1/spin", &json!({})).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = get_json(router, "/api/v1/spins/recent").await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().expect("data array");
        assert_eq!(data.len(), 10);
        assert_eq!(data[0]["restaurant_name"], "Spin Target");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn recent_spins_respect_limit(pool: sqlx::PgPool) {
        seed_restaurant(&pool, "Spin Target", "Pizza", false).await;
        let router = app(pool);
        for _ in 0..3 {
            send_json(router.clone(), Method::POST, "/api/v1/spin", &json!({})).await;
        }

        let (_, body) = get_json(router, "/api/v1/spins/recent?limit=2").await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }
}
