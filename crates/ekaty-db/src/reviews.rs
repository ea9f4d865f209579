//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::restaurants::refresh_rating;
use crate::DbError;

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a review and refresh the restaurant's cached rating in the same
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if this user already reviewed the
/// restaurant, or [`DbError::Sqlx`] for any other failure.
pub async fn create_review(
    pool: &PgPool,
    restaurant_id: Uuid,
    user_id: &str,
    rating: i16,
    comment: &str,
) -> Result<ReviewRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ReviewRow>(
        "INSERT INTO reviews (restaurant_id, user_id, rating, comment) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, restaurant_id) DO NOTHING \
         RETURNING id, restaurant_id, user_id, rating, comment, created_at",
    )
    .bind(restaurant_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::Duplicate)?;

    refresh_rating(&mut *tx, restaurant_id).await?;
    tx.commit().await?;

    Ok(row)
}

/// Reviews for a restaurant, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews_for_restaurant(
    pool: &PgPool,
    restaurant_id: Uuid,
    limit: i64,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, restaurant_id, user_id, rating, comment, created_at \
         FROM reviews \
         WHERE restaurant_id = $1 \
         ORDER BY created_at DESC, id \
         LIMIT $2",
    )
    .bind(restaurant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
