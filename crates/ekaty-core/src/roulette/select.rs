use rand::Rng;

use super::weight::WeightedCandidate;

/// Walk `weights` in order, subtracting each from `draw`; return the first
/// index at which the running value reaches zero or below.
///
/// `draw` is expected in `[0, total)`. A draw at or beyond the total (only
/// reachable through a caller-supplied value) falls back to the first index,
/// and an empty slice yields `None`.
#[must_use]
pub fn pick_index(weights: &[u32], draw: f64) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let mut remaining = draw;
    for (index, weight) in weights.iter().enumerate() {
        remaining -= f64::from(*weight);
        if remaining <= 0.0 {
            return Some(index);
        }
    }
    Some(0)
}

/// Draw one candidate with probability proportional to its weight.
///
/// The random source is supplied by the caller so tests can seed it.
pub fn select_weighted<'c, 'a, R>(
    candidates: &'c [WeightedCandidate<'a>],
    rng: &mut R,
) -> Option<&'c WeightedCandidate<'a>>
where
    R: Rng + ?Sized,
{
    let weights: Vec<u32> = candidates.iter().map(|c| c.weight).collect();
    let total: f64 = weights.iter().copied().map(f64::from).sum();
    let draw = rng.random::<f64>() * total;
    pick_index(&weights, draw).and_then(|index| candidates.get(index))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    use super::*;
    use crate::restaurants::Restaurant;

    fn restaurant(name: &str) -> Restaurant {
        Restaurant {
            id: Uuid::new_v4(),
            slug: name.to_lowercase(),
            name: name.to_string(),
            address: None,
            categories: String::new(),
            cuisine_types: String::new(),
            latitude: None,
            longitude: None,
            price_level: None,
            rating: None,
            review_count: 0,
            favorite_count: 0,
            active: true,
            featured: false,
            hours: None,
        }
    }

    #[test]
    fn walk_scenario_one_two_three() {
        let weights = [1, 2, 3];
        assert_eq!(pick_index(&weights, 0.5), Some(0));
        assert_eq!(pick_index(&weights, 1.5), Some(1));
        assert_eq!(pick_index(&weights, 5.9), Some(2));
    }

    #[test]
    fn boundaries_belong_to_the_earlier_candidate() {
        let weights = [1, 2, 3];
        assert_eq!(pick_index(&weights, 0.0), Some(0));
        assert_eq!(pick_index(&weights, 1.0), Some(0));
        assert_eq!(pick_index(&weights, 3.0), Some(1));
    }

    #[test]
    fn empty_weights_pick_nothing() {
        assert_eq!(pick_index(&[], 0.3), None);
    }

    #[test]
    fn overshooting_draw_falls_back_to_first() {
        assert_eq!(pick_index(&[1, 1], 7.0), Some(0));
    }

    #[test]
    fn same_seed_same_pick() {
        let pool: Vec<Restaurant> = ["A", "B", "C", "D"].into_iter().map(restaurant).collect();
        let candidates: Vec<WeightedCandidate<'_>> =
            pool.iter().map(WeightedCandidate::new).collect();

        let first = select_weighted(&candidates, &mut StdRng::seed_from_u64(42))
            .map(|c| c.restaurant.name.clone());
        let second = select_weighted(&candidates, &mut StdRng::seed_from_u64(42))
            .map(|c| c.restaurant.name.clone());
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn empirical_frequency_tracks_weight_share() {
        let pool: Vec<Restaurant> = ["A", "B", "C"].into_iter().map(restaurant).collect();
        let candidates: Vec<WeightedCandidate<'_>> = pool
            .iter()
            .zip([1_u32, 2, 3])
            .map(|(restaurant, weight)| WeightedCandidate { restaurant, weight })
            .collect();

        let trials = 100_000_u32;
        let mut counts = [0_u32; 3];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..trials {
            let picked = select_weighted(&candidates, &mut rng).expect("non-empty");
            let index = pool
                .iter()
                .position(|r| r.id == picked.restaurant.id)
                .expect("picked from pool");
            counts[index] += 1;
        }

        for (count, weight) in counts.iter().zip([1.0, 2.0, 3.0]) {
            let observed = f64::from(*count) / f64::from(trials);
            let expected = weight / 6.0;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn zero_bonus_candidates_still_get_picked() {
        let pool: Vec<Restaurant> = ["Plain", "Featured"].into_iter().map(restaurant).collect();
        let candidates = vec![
            WeightedCandidate {
                restaurant: &pool[0],
                weight: 1,
            },
            WeightedCandidate {
                restaurant: &pool[1],
                weight: 3,
            },
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let plain_hits = (0..2_000)
            .filter_map(|_| select_weighted(&candidates, &mut rng))
            .filter(|c| c.restaurant.name == "Plain")
            .count();
        assert!(plain_hits > 0);
    }
}
