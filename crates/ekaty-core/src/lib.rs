pub mod app_config;
pub mod config;
pub mod restaurants;
pub mod roulette;
pub mod seed_file;
pub mod spins;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use restaurants::{join_labels, slug_from_name, PriceLevel, Restaurant};
pub use roulette::{
    filter_candidates, haversine_miles, is_open_at, pick_index, select_weighted, spin,
    spin_weight, FilterSpec, GeoPoint, SearchArea, SpinSelection, WeightedCandidate,
};
pub use seed_file::{load_restaurant_seeds, RestaurantSeed, RestaurantsFile};
pub use spins::{generate_seed, SpinOutcome, SpinParams};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid price level: {0}")]
    InvalidPriceLevel(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read restaurants file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse restaurants file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),
    #[error("restaurants file validation failed: {0}")]
    Validation(String),
}

/// Failures on the selection path of a spin.
///
/// Recording failures are deliberately absent: they never reach the caller.
#[derive(Debug, Error, PartialEq)]
pub enum SpinError {
    #[error("no restaurants match your criteria")]
    NoCandidates,
    #[error("invalid spin request: {0}")]
    InvalidInput(String),
}
