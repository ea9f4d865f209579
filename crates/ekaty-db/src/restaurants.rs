//! Database operations for the `restaurants` table.

use chrono::{DateTime, Utc};
use ekaty_core::{PriceLevel, Restaurant};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `restaurants` table, with review and favorite counts
/// aggregated from their tables.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: Option<String>,
    pub categories: String,
    pub cuisine_types: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<String>,
    pub rating: Option<f64>,
    pub hours: Option<String>,
    pub active: bool,
    pub featured: bool,
    pub review_count: i64,
    pub favorite_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestaurantRow {
    /// Convert into the domain type the roulette works on.
    ///
    /// The table's CHECK constraint keeps `price_level` to known values.
    #[must_use]
    pub fn into_restaurant(self) -> Restaurant {
        Restaurant {
            id: self.id,
            slug: self.slug,
            name: self.name,
            address: self.address,
            categories: self.categories,
            cuisine_types: self.cuisine_types,
            latitude: self.latitude,
            longitude: self.longitude,
            price_level: self
                .price_level
                .as_deref()
                .and_then(|p| p.parse::<PriceLevel>().ok()),
            rating: self.rating,
            review_count: self.review_count,
            favorite_count: self.favorite_count,
            active: self.active,
            featured: self.featured,
            hours: self.hours,
        }
    }
}

/// Input record for creating a restaurant.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub slug: String,
    pub name: String,
    pub address: Option<String>,
    pub categories: String,
    pub cuisine_types: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub rating: Option<f64>,
    pub hours: Option<String>,
    pub featured: bool,
}

/// Sparse update for a restaurant.
///
/// Outer `None` keeps the current value; for nullable columns `Some(None)`
/// clears it.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub categories: Option<String>,
    pub cuisine_types: Option<String>,
    /// Coordinates change together.
    pub coordinates: Option<Option<(f64, f64)>>,
    pub price_level: Option<Option<PriceLevel>>,
    pub featured: Option<bool>,
    pub hours: Option<Option<String>>,
}

/// Directory listing filters.
#[derive(Debug, Clone, Default)]
pub struct RestaurantQuery {
    /// Case-insensitive name match or category substring.
    pub search: Option<String>,
    /// Any-of match against the comma-separated categories.
    pub categories: Vec<String>,
    pub price_levels: Vec<PriceLevel>,
    pub featured: Option<bool>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const RESTAURANT_COLUMNS: &str = "r.id, r.slug, r.name, r.address, r.categories, r.cuisine_types, \
     r.latitude::DOUBLE PRECISION AS latitude, r.longitude::DOUBLE PRECISION AS longitude, \
     r.price_level, r.rating, r.hours, r.active, r.featured, \
     (SELECT COUNT(*) FROM reviews rv WHERE rv.restaurant_id = r.id) AS review_count, \
     (SELECT COUNT(*) FROM favorites f WHERE f.restaurant_id = r.id) AS favorite_count, \
     r.created_at, r.updated_at";

/// Returns every active restaurant, ordered by creation time.
///
/// This is the pool a spin draws from.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_restaurants(pool: &PgPool) -> Result<Vec<RestaurantRow>, DbError> {
    let sql = format!(
        "SELECT {RESTAURANT_COLUMNS} \
         FROM restaurants r \
         WHERE r.active = TRUE \
         ORDER BY r.created_at, r.id"
    );
    let rows = sqlx::query_as::<_, RestaurantRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Active restaurants that have coordinates, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mappable_restaurants(pool: &PgPool) -> Result<Vec<RestaurantRow>, DbError> {
    let sql = format!(
        "SELECT {RESTAURANT_COLUMNS} \
         FROM restaurants r \
         WHERE r.active = TRUE \
           AND r.latitude IS NOT NULL \
           AND r.longitude IS NOT NULL \
         ORDER BY r.name, r.id"
    );
    let rows = sqlx::query_as::<_, RestaurantRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Directory listing: active restaurants, featured first, then by rating.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_restaurants(
    pool: &PgPool,
    query: &RestaurantQuery,
) -> Result<Vec<RestaurantRow>, DbError> {
    let sql = format!(
        "SELECT {RESTAURANT_COLUMNS} \
         FROM restaurants r \
         WHERE r.active = TRUE \
           AND ($1::TEXT IS NULL \
                OR r.name ILIKE '%' || $1 || '%' \
                OR r.categories LIKE '%' || $1 || '%') \
           AND (cardinality($2::TEXT[]) = 0 \
                OR string_to_array(r.categories, ',') && $2::TEXT[]) \
           AND (cardinality($3::TEXT[]) = 0 OR r.price_level = ANY($3::TEXT[])) \
           AND ($4::BOOL IS NULL OR r.featured = $4) \
         ORDER BY r.featured DESC, r.rating DESC NULLS LAST, r.name \
         LIMIT $5"
    );
    let price_levels: Vec<&str> = query.price_levels.iter().map(|p| p.as_str()).collect();

    let rows = sqlx::query_as::<_, RestaurantRow>(&sql)
        .bind(query.search.as_deref())
        .bind(&query.categories)
        .bind(&price_levels)
        .bind(query.featured)
        .bind(query.limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns a single active restaurant by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_restaurant_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<RestaurantRow>, DbError> {
    let sql = format!(
        "SELECT {RESTAURANT_COLUMNS} \
         FROM restaurants r \
         WHERE r.slug = $1 AND r.active = TRUE"
    );
    let row = sqlx::query_as::<_, RestaurantRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Returns a single active restaurant by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_restaurant_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<RestaurantRow>, DbError> {
    let sql = format!(
        "SELECT {RESTAURANT_COLUMNS} \
         FROM restaurants r \
         WHERE r.id = $1 AND r.active = TRUE"
    );
    let row = sqlx::query_as::<_, RestaurantRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn fetch_restaurant_any_state(pool: &PgPool, id: Uuid) -> Result<RestaurantRow, DbError> {
    let sql = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants r WHERE r.id = $1");
    sqlx::query_as::<_, RestaurantRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Creates a new restaurant and returns the full row.
///
/// Latitude and longitude are bound as `f64` and cast to `NUMERIC(9,6)`
/// inside the statement.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate slug).
pub async fn create_restaurant(
    pool: &PgPool,
    new: &NewRestaurant,
) -> Result<RestaurantRow, DbError> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO restaurants \
           (slug, name, address, categories, cuisine_types, latitude, longitude, \
            price_level, rating, hours, featured, active) \
         VALUES ($1, $2, $3, $4, $5, $6::NUMERIC(9,6), $7::NUMERIC(9,6), $8, $9, $10, $11, TRUE) \
         RETURNING id",
    )
    .bind(&new.slug)
    .bind(&new.name)
    .bind(&new.address)
    .bind(&new.categories)
    .bind(&new.cuisine_types)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(new.price_level.map(PriceLevel::as_str))
    .bind(new.rating)
    .bind(&new.hours)
    .bind(new.featured)
    .fetch_one(pool)
    .await?;

    fetch_restaurant_any_state(pool, id).await
}

/// Applies a sparse update and returns the updated row.
///
/// Single `UPDATE` with `COALESCE` for required columns and a supplied-flag
/// `CASE` for nullable ones.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no restaurant has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_restaurant(
    pool: &PgPool,
    id: Uuid,
    update: &RestaurantUpdate,
) -> Result<RestaurantRow, DbError> {
    let address_supplied = update.address.is_some();
    let address_val = update.address.clone().flatten();
    let coords_supplied = update.coordinates.is_some();
    let coords_val = update.coordinates.flatten();
    let price_supplied = update.price_level.is_some();
    let price_val = update.price_level.flatten().map(PriceLevel::as_str);
    let hours_supplied = update.hours.is_some();
    let hours_val = update.hours.clone().flatten();

    let updated: Option<Uuid> = sqlx::query_scalar(
        "UPDATE restaurants \
         SET name          = COALESCE($2, name), \
             categories    = COALESCE($3, categories), \
             cuisine_types = COALESCE($4, cuisine_types), \
             featured      = COALESCE($5, featured), \
             address       = CASE WHEN $6::BOOL  THEN $7  ELSE address END, \
             latitude      = CASE WHEN $8::BOOL  THEN $9::NUMERIC(9,6)  ELSE latitude END, \
             longitude     = CASE WHEN $8::BOOL  THEN $10::NUMERIC(9,6) ELSE longitude END, \
             price_level   = CASE WHEN $11::BOOL THEN $12 ELSE price_level END, \
             hours         = CASE WHEN $13::BOOL THEN $14 ELSE hours END, \
             updated_at    = NOW() \
         WHERE id = $1 \
         RETURNING id",
    )
    .bind(id)
    .bind(update.name.as_deref())
    .bind(update.categories.as_deref())
    .bind(update.cuisine_types.as_deref())
    .bind(update.featured)
    .bind(address_supplied)
    .bind(address_val)
    .bind(coords_supplied)
    .bind(coords_val.map(|(lat, _)| lat))
    .bind(coords_val.map(|(_, lng)| lng))
    .bind(price_supplied)
    .bind(price_val)
    .bind(hours_supplied)
    .bind(hours_val)
    .fetch_optional(pool)
    .await?;

    let id = updated.ok_or(DbError::NotFound)?;
    fetch_restaurant_any_state(pool, id).await
}

/// Soft-deactivates a restaurant. Returns `true` if a row changed.
///
/// Past spins keep pointing at the row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_restaurant(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let rows = sqlx::query(
        "UPDATE restaurants \
         SET active = FALSE, updated_at = NOW() \
         WHERE id = $1 AND active = TRUE",
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

/// Recompute the cached `rating` from the restaurant's reviews.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub(crate) async fn refresh_rating<'e, E>(executor: E, id: Uuid) -> Result<(), DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE restaurants \
         SET rating = (SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE restaurant_id = $1), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}
