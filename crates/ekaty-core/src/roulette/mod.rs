//! Grub Roulette: filter the active pool, weight what survives, draw one.

mod filter;
mod geo;
mod select;
mod weight;

pub use filter::{filter_candidates, is_open_at, FilterSpec, SearchArea};
pub use geo::{haversine_miles, GeoPoint, EARTH_RADIUS_MILES};
pub use select::{pick_index, select_weighted};
pub use weight::{spin_weight, WeightedCandidate};

use rand::Rng;

use crate::restaurants::Restaurant;
use crate::SpinError;

/// The restaurant a spin landed on, borrowed from the caller's pool.
#[derive(Debug, Clone, Copy)]
pub struct SpinSelection<'a> {
    pub restaurant: &'a Restaurant,
    /// How many restaurants passed the filter.
    pub candidates_count: usize,
}

/// Run one spin over `pool`.
///
/// `local_hour` drives the open-now rule; `rng` drives the weighted draw.
///
/// # Errors
///
/// Returns [`SpinError::NoCandidates`] when nothing passes `spec`.
pub fn spin<'a, R>(
    pool: &'a [Restaurant],
    spec: &FilterSpec,
    local_hour: u32,
    rng: &mut R,
) -> Result<SpinSelection<'a>, SpinError>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<WeightedCandidate<'a>> = filter_candidates(pool, spec, local_hour)
        .into_iter()
        .map(WeightedCandidate::new)
        .collect();

    let picked = select_weighted(&candidates, rng).ok_or(SpinError::NoCandidates)?;

    Ok(SpinSelection {
        restaurant: picked.restaurant,
        candidates_count: candidates.len(),
    })
}
