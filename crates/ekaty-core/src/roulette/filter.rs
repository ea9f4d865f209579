use std::collections::HashSet;

use uuid::Uuid;

use super::geo::{haversine_miles, GeoPoint};
use crate::restaurants::{PriceLevel, Restaurant};
use crate::SpinError;

/// First local hour at which every restaurant counts as open.
pub const OPEN_FROM_HOUR: u32 = 11;
/// Local hour at which every restaurant counts as closed again.
pub const OPEN_UNTIL_HOUR: u32 = 22;

/// A center point plus radius that candidates must fall within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

impl SearchArea {
    /// Build a validated search area.
    ///
    /// # Errors
    ///
    /// Returns [`SpinError::InvalidInput`] for non-finite or out-of-range
    /// coordinates, or a negative/non-finite radius.
    pub fn new(center: GeoPoint, radius_miles: f64) -> Result<Self, SpinError> {
        if !center.lat.is_finite() || !(-90.0..=90.0).contains(&center.lat) {
            return Err(SpinError::InvalidInput(format!(
                "lat must be between -90 and 90, got {}",
                center.lat
            )));
        }
        if !center.lng.is_finite() || !(-180.0..=180.0).contains(&center.lng) {
            return Err(SpinError::InvalidInput(format!(
                "lng must be between -180 and 180, got {}",
                center.lng
            )));
        }
        if !radius_miles.is_finite() || radius_miles < 0.0 {
            return Err(SpinError::InvalidInput(format!(
                "radius must be a non-negative number of miles, got {radius_miles}"
            )));
        }
        Ok(Self {
            center,
            radius_miles,
        })
    }

    fn contains(&self, restaurant: &Restaurant) -> bool {
        restaurant
            .location()
            .is_some_and(|point| haversine_miles(self.center, point) <= self.radius_miles)
    }
}

/// Request-scoped constraints narrowing the pool before a spin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// OR-matched; empty means no category constraint.
    pub categories: Vec<String>,
    pub price_level: Option<PriceLevel>,
    pub open_now: bool,
    pub area: Option<SearchArea>,
    pub exclude_ids: HashSet<Uuid>,
}

impl FilterSpec {
    /// Whether `restaurant` passes every constraint, given the current local hour.
    #[must_use]
    pub fn accepts(&self, restaurant: &Restaurant, local_hour: u32) -> bool {
        restaurant.active
            && !self.exclude_ids.contains(&restaurant.id)
            && self.matches_category(restaurant)
            && self
                .price_level
                .is_none_or(|level| restaurant.price_level == Some(level))
            && self.area.as_ref().is_none_or(|area| area.contains(restaurant))
            && (!self.open_now || is_open_at(local_hour))
    }

    fn matches_category(&self, restaurant: &Restaurant) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|wanted| restaurant.categories.contains(wanted.as_str()))
    }
}

/// Simplified opening-hours rule: every restaurant is open from 11:00 until
/// 22:00 local time, whatever its stored schedule says.
#[must_use]
pub fn is_open_at(local_hour: u32) -> bool {
    (OPEN_FROM_HOUR..OPEN_UNTIL_HOUR).contains(&local_hour)
}

/// Reduce `pool` to the restaurants eligible for a spin, preserving order.
#[must_use]
pub fn filter_candidates<'a>(
    pool: &'a [Restaurant],
    spec: &FilterSpec,
    local_hour: u32,
) -> Vec<&'a Restaurant> {
    pool.iter()
        .filter(|restaurant| spec.accepts(restaurant, local_hour))
        .collect()
}
