//! `spin` command: run Grub Roulette from the terminal.
//!
//! Uses the same filter and weighting as the HTTP endpoint. `--dry-run`
//! prints the pick without recording it.

use chrono::{Local, Timelike, Utc};
use clap::Args;
use ekaty_core::{AppConfig, PriceLevel, Restaurant, SpinOutcome, SpinParams};

#[derive(Debug, Args)]
pub(crate) struct SpinArgs {
    /// Category to match (repeatable; any match counts)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// BUDGET, MODERATE, UPSCALE, PREMIUM, or $..$$$$
    #[arg(long)]
    pub price_level: Option<PriceLevel>,

    /// Only restaurants open right now
    #[arg(long)]
    pub open_now: bool,

    /// Search center latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Search center longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Search radius in miles
    #[arg(long)]
    pub radius: Option<f64>,

    /// Session id to record the spin under
    #[arg(long)]
    pub session: Option<String>,

    /// Pick without recording the spin
    #[arg(long)]
    pub dry_run: bool,
}

impl SpinArgs {
    fn to_params(&self) -> SpinParams {
        SpinParams {
            categories: self.categories.clone(),
            price_level: self.price_level,
            open_now: self.open_now,
            radius: self.radius,
            lat: self.lat,
            lng: self.lng,
            exclude_ids: Vec::new(),
            user_id: None,
            session_id: self.session.clone(),
        }
    }
}

/// The restaurant a CLI spin landed on.
#[derive(Debug)]
pub(crate) struct CliSpin {
    pub restaurant: Restaurant,
    pub candidates_count: usize,
    pub outcome: SpinOutcome,
    pub recorded: bool,
}

impl CliSpin {
    /// One-line summary for the terminal.
    pub(crate) fn summary(&self, dry_run: bool) -> String {
        let mut line = format!(
            "{} ({}) - picked from {} candidate(s), seed {}",
            self.restaurant.name, self.restaurant.slug, self.candidates_count, self.outcome.seed
        );
        if dry_run {
            line.push_str(" [dry run]");
        } else if !self.recorded {
            line.push_str(" [not recorded]");
        }
        line
    }
}

fn draw(
    pool: &[Restaurant],
    params: &SpinParams,
    default_radius_miles: f64,
    local_hour: u32,
) -> anyhow::Result<(Restaurant, usize, SpinOutcome)> {
    let spec = params.to_filter_spec(default_radius_miles)?;
    let mut rng = rand::rng();
    let selection = ekaty_core::spin(pool, &spec, local_hour, &mut rng)?;
    let outcome = SpinOutcome::new(
        selection.restaurant.id,
        params,
        default_radius_miles,
        Utc::now(),
        &mut rng,
    );
    Ok((
        selection.restaurant.clone(),
        selection.candidates_count,
        outcome,
    ))
}

/// Spin against the active restaurants, recording the outcome unless
/// `dry_run` is set.
///
/// # Errors
///
/// Returns an error for invalid arguments, an empty match, or a failed
/// restaurant query. A failed recording is logged, not returned.
pub(crate) async fn run_spin(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    args: &SpinArgs,
) -> anyhow::Result<CliSpin> {
    let params = args.to_params();
    let restaurants: Vec<Restaurant> = ekaty_db::list_active_restaurants(pool)
        .await?
        .into_iter()
        .map(ekaty_db::RestaurantRow::into_restaurant)
        .collect();

    let (restaurant, candidates_count, outcome) = draw(
        &restaurants,
        &params,
        config.spin_default_radius_miles,
        Local::now().hour(),
    )?;

    let recorded = if args.dry_run {
        false
    } else {
        match ekaty_db::record_spin(pool, &outcome).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, seed = %outcome.seed, "failed to record spin");
                false
            }
        }
    };

    Ok(CliSpin {
        restaurant,
        candidates_count,
        outcome,
        recorded,
    })
}

#[cfg(test)]
#[path = "spin_test.rs"]
mod tests;
