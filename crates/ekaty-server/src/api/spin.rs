//! `POST /api/v1/spin`: Grub Roulette.
//!
//! Filters the active pool, draws one restaurant by weight, then records the
//! outcome. Recording is best-effort: a failed insert is logged and the
//! caller still gets the pick.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::{Local, Timelike, Utc};
use ekaty_core::{FilterSpec, Restaurant, SpinError, SpinOutcome, SpinParams};
use serde::Serialize;
use sqlx::PgPool;

use crate::middleware::RequestId;

use super::restaurants::RestaurantItem;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const NO_MATCH_MESSAGE: &str = "No restaurants match your criteria";

#[derive(Debug, Serialize)]
pub(super) struct SpinResult {
    restaurant: RestaurantItem,
    seed: String,
    candidates_count: usize,
}

struct Drawn {
    restaurant: RestaurantItem,
    candidates_count: usize,
    outcome: SpinOutcome,
}

fn spin_error(request_id: &str, error: &SpinError) -> ApiError {
    match error {
        SpinError::NoCandidates => ApiError::new(request_id, "not_found", NO_MATCH_MESSAGE),
        SpinError::InvalidInput(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
    }
}

// Kept synchronous so the thread-local RNG never lives across an await.
fn draw(
    pool: &[Restaurant],
    spec: &FilterSpec,
    params: &SpinParams,
    default_radius_miles: f64,
    local_hour: u32,
) -> Result<Drawn, SpinError> {
    let mut rng = rand::rng();
    let selection = ekaty_core::spin(pool, spec, local_hour, &mut rng)?;
    let outcome = SpinOutcome::new(
        selection.restaurant.id,
        params,
        default_radius_miles,
        Utc::now(),
        &mut rng,
    );

    Ok(Drawn {
        restaurant: RestaurantItem::from(selection.restaurant),
        candidates_count: selection.candidates_count,
        outcome,
    })
}

/// Persist `outcome`, logging instead of failing.
async fn record_spin_best_effort(pool: &PgPool, outcome: &SpinOutcome) {
    match ekaty_db::record_spin(pool, outcome).await {
        Ok(id) => tracing::debug!(spin_id = id, seed = %outcome.seed, "spin recorded"),
        Err(e) => tracing::warn!(
            error = %e,
            restaurant_id = %outcome.restaurant_id,
            seed = %outcome.seed,
            "failed to record spin"
        ),
    }
}

pub(super) async fn spin(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SpinParams>, JsonRejection>,
) -> Result<Json<ApiResponse<SpinResult>>, ApiError> {
    let rid = &req_id.0;
    let Json(params) = body.map_err(|e| ApiError::new(rid, "validation_error", e.body_text()))?;

    let default_radius = state.config.spin_default_radius_miles;
    let spec = params
        .to_filter_spec(default_radius)
        .map_err(|e| spin_error(rid, &e))?;

    let pool: Vec<Restaurant> = ekaty_db::list_active_restaurants(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .into_iter()
        .map(ekaty_db::RestaurantRow::into_restaurant)
        .collect();

    let drawn = draw(
        &pool,
        &spec,
        &params,
        default_radius,
        Local::now().hour(),
    )
    .map_err(|e| {
        tracing::info!(pool_size = pool.len(), "spin found no candidates");
        spin_error(rid, &e)
    })?;

    tracing::info!(
        restaurant = %drawn.restaurant.slug,
        candidates = drawn.candidates_count,
        seed = %drawn.outcome.seed,
        "spin landed"
    );

    record_spin_best_effort(&state.pool, &drawn.outcome).await;

    Ok(Json(ApiResponse {
        data: SpinResult {
            restaurant: drawn.restaurant,
            seed: drawn.outcome.seed,
            candidates_count: drawn.candidates_count,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
