use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::restaurants::PriceLevel;
use crate::roulette::{FilterSpec, GeoPoint, SearchArea};
use crate::SpinError;

const SEED_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SEED_LEN: usize = 8;

/// User-supplied spin parameters, as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpinParams {
    pub categories: Vec<String>,
    pub price_level: Option<PriceLevel>,
    pub open_now: bool,
    /// Miles; falls back to the configured default when absent.
    pub radius: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub exclude_ids: Vec<Uuid>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl SpinParams {
    /// Validate the parameters and turn them into a [`FilterSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidInput`] when only one of `lat`/`lng` is
    /// given, or when coordinates or radius are out of range.
    pub fn to_filter_spec(&self, default_radius_miles: f64) -> Result<FilterSpec, SpinError> {
        let area = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(SearchArea::new(
                GeoPoint { lat, lng },
                self.radius_or(default_radius_miles),
            )?),
            (None, None) => None,
            _ => {
                return Err(SpinError::InvalidInput(
                    "lat and lng must be provided together".to_string(),
                ))
            }
        };

        // Requested labels are matched as given; no trimming or case folding.
        Ok(FilterSpec {
            categories: self.categories.clone(),
            price_level: self.price_level,
            open_now: self.open_now,
            area,
            exclude_ids: self.exclude_ids.iter().copied().collect::<HashSet<_>>(),
        })
    }

    fn radius_or(&self, default_radius_miles: f64) -> f64 {
        self.radius.unwrap_or(default_radius_miles)
    }

    /// The parameter snapshot stored alongside a spin outcome.
    #[must_use]
    pub fn recorded_params(&self, default_radius_miles: f64) -> serde_json::Value {
        serde_json::json!({
            "categories": self.categories,
            "priceLevel": self.price_level,
            "openNow": self.open_now,
            "radius": self.radius_or(default_radius_miles),
            "lat": self.lat,
            "lng": self.lng,
        })
    }
}

/// The persisted record of a completed spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub restaurant_id: Uuid,
    pub spin_params: serde_json::Value,
    pub seed: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SpinOutcome {
    /// Build the outcome for a spin that landed on `restaurant_id`.
    ///
    /// Anonymous spins (no user, no session) get a synthetic
    /// `anon-<unix millis>` session id.
    pub fn new<R>(
        restaurant_id: Uuid,
        params: &SpinParams,
        default_radius_miles: f64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let session_id = match (&params.session_id, &params.user_id) {
            (Some(session), _) if !session.is_empty() => Some(session.clone()),
            (_, Some(user)) if !user.is_empty() => None,
            _ => Some(format!("anon-{}", now.timestamp_millis())),
        };

        Self {
            restaurant_id,
            spin_params: params.recorded_params(default_radius_miles),
            seed: generate_seed(rng),
            user_id: params.user_id.clone(),
            session_id,
            created_at: now,
        }
    }
}

/// Opaque lowercase base-36 token identifying a spin.
pub fn generate_seed<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    (0..SEED_LEN)
        .map(|_| char::from(SEED_ALPHABET[rng.random_range(0..SEED_ALPHABET.len())]))
        .collect()
}
