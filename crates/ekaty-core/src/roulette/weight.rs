use crate::restaurants::Restaurant;

const BASE_WEIGHT: u32 = 1;
const FEATURED_BONUS: u32 = 2;
const TOP_RATED_BONUS: u32 = 1;
const POPULAR_BONUS: u32 = 1;

const TOP_RATED_MIN_RATING: f64 = 4.5;
const POPULAR_MIN_REVIEWS: i64 = 100;

/// A candidate paired with its sampling weight for one selection call.
#[derive(Debug, Clone, Copy)]
pub struct WeightedCandidate<'a> {
    pub restaurant: &'a Restaurant,
    pub weight: u32,
}

impl<'a> WeightedCandidate<'a> {
    #[must_use]
    pub fn new(restaurant: &'a Restaurant) -> Self {
        Self {
            restaurant,
            weight: spin_weight(restaurant),
        }
    }
}

/// Sampling weight for a restaurant: 1, plus 2 if featured, plus 1 for a
/// rating of at least 4.5, plus 1 for more than 100 reviews.
#[must_use]
pub fn spin_weight(restaurant: &Restaurant) -> u32 {
    let mut weight = BASE_WEIGHT;
    if restaurant.featured {
        weight += FEATURED_BONUS;
    }
    if restaurant
        .rating
        .is_some_and(|rating| rating >= TOP_RATED_MIN_RATING)
    {
        weight += TOP_RATED_BONUS;
    }
    if restaurant.review_count > POPULAR_MIN_REVIEWS {
        weight += POPULAR_BONUS;
    }
    weight
}
