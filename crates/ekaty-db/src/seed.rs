use ekaty_core::RestaurantSeed;
use sqlx::PgPool;

use crate::DbError;

/// Upsert restaurants from the seed file, keyed by slug.
///
/// Returns the number of restaurants processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back. Seeding re-activates a restaurant that
/// an admin had deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_restaurants(
    pool: &PgPool,
    restaurants: &[RestaurantSeed],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for restaurant in restaurants {
        sqlx::query(
            "INSERT INTO restaurants \
               (slug, name, address, categories, cuisine_types, latitude, longitude, \
                price_level, rating, hours, featured, active) \
             VALUES ($1, $2, $3, $4, $5, $6::NUMERIC(9,6), $7::NUMERIC(9,6), $8, $9, $10, $11, TRUE) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name          = EXCLUDED.name, \
                 address       = EXCLUDED.address, \
                 categories    = EXCLUDED.categories, \
                 cuisine_types = EXCLUDED.cuisine_types, \
                 latitude      = EXCLUDED.latitude, \
                 longitude     = EXCLUDED.longitude, \
                 price_level   = EXCLUDED.price_level, \
                 rating        = EXCLUDED.rating, \
                 hours         = EXCLUDED.hours, \
                 featured      = EXCLUDED.featured, \
                 active        = TRUE, \
                 updated_at    = NOW()",
        )
        .bind(restaurant.slug())
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(restaurant.categories_joined())
        .bind(restaurant.cuisine_types_joined())
        .bind(restaurant.latitude)
        .bind(restaurant.longitude)
        .bind(restaurant.price_level.map(ekaty_core::PriceLevel::as_str))
        .bind(restaurant.rating)
        .bind(restaurant.hours_text())
        .bind(restaurant.featured)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
