//! Database operations for the `favorites` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A favorite joined with the restaurant's display fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteRow {
    pub id: Uuid,
    pub user_id: String,
    pub restaurant_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub restaurant_name: String,
    pub restaurant_slug: String,
}

/// A user's favorites, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_favorites_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<FavoriteRow>, DbError> {
    let rows = sqlx::query_as::<_, FavoriteRow>(
        "SELECT f.id, f.user_id, f.restaurant_id, f.notes, f.created_at, \
                r.name AS restaurant_name, r.slug AS restaurant_slug \
         FROM favorites f \
         JOIN restaurants r ON r.id = f.restaurant_id \
         WHERE f.user_id = $1 \
         ORDER BY f.created_at DESC, f.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Add a restaurant to a user's favorites.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if it is already a favorite, or
/// [`DbError::Sqlx`] for any other failure.
pub async fn add_favorite(
    pool: &PgPool,
    user_id: &str,
    restaurant_id: Uuid,
    notes: Option<&str>,
) -> Result<FavoriteRow, DbError> {
    sqlx::query_as::<_, FavoriteRow>(
        "WITH inserted AS ( \
             INSERT INTO favorites (user_id, restaurant_id, notes) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, restaurant_id) DO NOTHING \
             RETURNING id, user_id, restaurant_id, notes, created_at \
         ) \
         SELECT i.id, i.user_id, i.restaurant_id, i.notes, i.created_at, \
                r.name AS restaurant_name, r.slug AS restaurant_slug \
         FROM inserted i \
         JOIN restaurants r ON r.id = i.restaurant_id",
    )
    .bind(user_id)
    .bind(restaurant_id)
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::Duplicate)
}

/// Remove a favorite. Returns `false` if there was nothing to remove.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn remove_favorite(
    pool: &PgPool,
    user_id: &str,
    restaurant_id: Uuid,
) -> Result<bool, DbError> {
    let rows = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND restaurant_id = $2")
        .bind(user_id)
        .bind(restaurant_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
