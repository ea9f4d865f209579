use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, resolve_restaurant, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateReviewRequest {
    pub user_id: Option<String>,
    pub restaurant_id: Option<Uuid>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReviewsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewItem {
    id: Uuid,
    restaurant_id: Uuid,
    user_id: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ekaty_db::ReviewRow> for ReviewItem {
    fn from(row: ekaty_db::ReviewRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

struct ValidReview {
    user_id: String,
    restaurant_id: Uuid,
    rating: i16,
    comment: String,
}

fn validate(request_id: &str, body: CreateReviewRequest) -> Result<ValidReview, ApiError> {
    let invalid = |message: &str| ApiError::new(request_id, "validation_error", message);

    let user_id = body
        .user_id
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| invalid("userId is required"))?;
    let restaurant_id = body
        .restaurant_id
        .ok_or_else(|| invalid("restaurantId is required"))?;
    let rating = body
        .rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| invalid("rating must be between 1 and 5"))?;
    let comment = body
        .comment
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| invalid("comment is required"))?;
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(invalid("comment must be 500 characters or fewer"));
    }

    Ok(ValidReview {
        user_id,
        restaurant_id,
        rating,
        comment,
    })
}

/// POST /api/v1/reviews
pub(super) async fn create_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewItem>>), ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|e| ApiError::new(rid, "validation_error", e.body_text()))?;
    let review = validate(rid, body)?;

    let exists = ekaty_db::get_restaurant_by_id(&state.pool, review.restaurant_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .is_some();
    if !exists {
        return Err(ApiError::new(rid, "not_found", "restaurant not found"));
    }

    let row = ekaty_db::create_review(
        &state.pool,
        review.restaurant_id,
        &review.user_id,
        review.rating,
        &review.comment,
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::new(rid, "conflict", "you have already reviewed this restaurant")
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;

    tracing::info!(
        restaurant_id = %row.restaurant_id,
        rating = row.rating,
        "review created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ReviewItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/restaurants/{slug}/reviews
pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewItem>>>, ApiError> {
    let restaurant = resolve_restaurant(&state.pool, &slug, &req_id.0).await?;

    let rows = ekaty_db::list_reviews_for_restaurant(
        &state.pool,
        restaurant.id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ReviewItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::super::test_support::{app, get_json, seed_restaurant, send_json};
    use super::*;

    fn request(rating: i16, comment: &str) -> CreateReviewRequest {
        CreateReviewRequest {
            user_id: Some("u1".to_string()),
            restaurant_id: Some(Uuid::new_v4()),
            rating: Some(rating),
            comment: Some(comment.to_string()),
        }
    }

    #[test]
    fn validate_bounds_rating() {
        assert!(validate("r", request(0, "ok")).is_err());
        assert!(validate("r", request(6, "ok")).is_err());
        assert!(validate("r", request(1, "ok")).is_ok());
        assert!(validate("r", request(5, "ok")).is_ok());
    }

    #[test]
    fn validate_requires_non_blank_comment_within_limit() {
        assert!(validate("r", request(4, "   ")).is_err());
        assert!(validate("r", request(4, &"x".repeat(500))).is_ok());
        let err = validate("r", request(4, &"x".repeat(501))).err().expect("too long");
        assert_eq!(err.error.code, "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn review_updates_rating_and_rejects_duplicates(pool: sqlx::PgPool) {
        let id = seed_restaurant(&pool, "Review Me", "Diner", false).await;
        let router = app(pool);

        for (user, rating) in [("u1", 5), ("u2", 3)] {
            let (status, _) = send_json(
                router.clone(),
                Method::POST,
                "/api/v1/reviews",
                &json!({ "userId": user, "restaurantId": id, "rating": rating, "comment": "fine" }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send_json(
            router.clone(),
            Method::POST,
            "/api/v1/reviews",
            &json!({ "userId": "u1", "restaurantId": id, "rating": 1, "comment": "again" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");

        let (_, body) = get_json(router.clone(), "/api/v1/restaurants/review-me").await;
        assert_eq!(body["data"]["rating"], 4.0);
        assert_eq!(body["data"]["review_count"], 2);

        let (status, body) = get_json(router, "/api/v1/restaurants/review-me/reviews").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn review_for_unknown_restaurant_is_404(pool: sqlx::PgPool) {
        let (status, _) = send_json(
            app(pool),
            Method::POST,
            "/api/v1/reviews",
            &json!({ "userId": "u1", "restaurantId": Uuid::new_v4(), "rating": 4, "comment": "hm" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
