use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::restaurants::{join_labels, slug_from_name, PriceLevel};
use crate::ConfigError;

/// One restaurant entry in the directory seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantSeed {
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    /// Weekly schedule, stored as JSON text.
    pub hours: Option<serde_json::Value>,
}

impl RestaurantSeed {
    #[must_use]
    pub fn slug(&self) -> String {
        slug_from_name(&self.name)
    }

    #[must_use]
    pub fn categories_joined(&self) -> String {
        join_labels(&self.categories)
    }

    #[must_use]
    pub fn cuisine_types_joined(&self) -> String {
        join_labels(&self.cuisine_types)
    }

    #[must_use]
    pub fn hours_text(&self) -> Option<String> {
        self.hours.as_ref().map(serde_json::Value::to_string)
    }
}

#[derive(Debug, Deserialize)]
pub struct RestaurantsFile {
    pub restaurants: Vec<RestaurantSeed>,
}

/// Load and validate the restaurant seed file (YAML).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_restaurant_seeds(path: &Path) -> Result<RestaurantsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: RestaurantsFile = serde_yaml::from_str(&content)?;
    validate_restaurants(&file)?;
    Ok(file)
}

fn validate_restaurants(file: &RestaurantsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for restaurant in &file.restaurants {
        if restaurant.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "restaurant name must be non-empty".to_string(),
            ));
        }

        if let Some(rating) = restaurant.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "restaurant '{}' has invalid rating {rating}; must be between 0 and 5",
                    restaurant.name
                )));
            }
        }

        if restaurant.latitude.is_some() != restaurant.longitude.is_some() {
            return Err(ConfigError::Validation(format!(
                "restaurant '{}' must set latitude and longitude together",
                restaurant.name
            )));
        }

        let slug = restaurant.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "restaurant '{}' produces an empty slug",
                restaurant.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate restaurant slug: '{}' (from restaurant '{}')",
                slug, restaurant.name
            )));
        }
    }

    Ok(())
}
