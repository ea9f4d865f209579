//! Database operations for the `spins` table.
//!
//! Spin rows are append-only history; nothing here updates or deletes them.

use chrono::{DateTime, Utc};
use ekaty_core::SpinOutcome;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `spins` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpinRow {
    pub id: i64,
    pub restaurant_id: Uuid,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub spin_params: serde_json::Value,
    pub seed: String,
    pub created_at: DateTime<Utc>,
}

/// A recent spin with the restaurant name, for the activity feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentSpinRow {
    pub id: i64,
    pub restaurant_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persist a spin outcome and return its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_spin(pool: &PgPool, outcome: &SpinOutcome) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO spins (restaurant_id, user_id, session_id, spin_params, seed, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(outcome.restaurant_id)
    .bind(&outcome.user_id)
    .bind(&outcome.session_id)
    .bind(&outcome.spin_params)
    .bind(&outcome.seed)
    .bind(outcome.created_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Most recent spins across all users, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_spins(pool: &PgPool, limit: i64) -> Result<Vec<RecentSpinRow>, DbError> {
    let rows = sqlx::query_as::<_, RecentSpinRow>(
        "SELECT s.id, r.name AS restaurant_name, s.created_at \
         FROM spins s \
         LEFT JOIN restaurants r ON r.id = s.restaurant_id \
         ORDER BY s.created_at DESC, s.id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every spin recorded for a session, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_spins_for_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<SpinRow>, DbError> {
    let rows = sqlx::query_as::<_, SpinRow>(
        "SELECT id, restaurant_id, user_id, session_id, spin_params, seed, created_at \
         FROM spins \
         WHERE session_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
