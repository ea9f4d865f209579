use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roulette::GeoPoint;
use crate::CoreError;

/// Price tier of a restaurant, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLevel {
    Budget,
    Moderate,
    Upscale,
    #[serde(alias = "FINE_DINING")]
    Premium,
}

impl PriceLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceLevel::Budget => "BUDGET",
            PriceLevel::Moderate => "MODERATE",
            PriceLevel::Upscale => "UPSCALE",
            PriceLevel::Premium => "PREMIUM",
        }
    }
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUDGET" | "$" => Ok(PriceLevel::Budget),
            "MODERATE" | "$$" => Ok(PriceLevel::Moderate),
            "UPSCALE" | "$$$" => Ok(PriceLevel::Upscale),
            "PREMIUM" | "FINE_DINING" | "$$$$" => Ok(PriceLevel::Premium),
            _ => Err(CoreError::InvalidPriceLevel(s.to_string())),
        }
    }
}

/// A restaurant as the roulette and directory see it.
///
/// `categories` and `cuisine_types` keep the stored comma-joined form; the
/// category filter matches against the raw string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub address: Option<String>,
    pub categories: String,
    pub cuisine_types: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_level: Option<PriceLevel>,
    /// Average review score on a 0 to 5 scale.
    pub rating: Option<f64>,
    pub review_count: i64,
    pub favorite_count: i64,
    pub active: bool,
    pub featured: bool,
    /// JSON-encoded weekly schedule, stored verbatim.
    pub hours: Option<String>,
}

impl Restaurant {
    /// Both coordinates, or `None` if either is missing.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }

    #[must_use]
    pub fn category_list(&self) -> Vec<String> {
        split_joined(&self.categories)
    }

    #[must_use]
    pub fn cuisine_type_list(&self) -> Vec<String> {
        split_joined(&self.cuisine_types)
    }

    /// Parsed `hours` blob. Missing or malformed data yields an empty object.
    #[must_use]
    pub fn hours_json(&self) -> serde_json::Value {
        self.hours
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()))
    }
}

fn split_joined(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Join a list of labels into the stored comma-separated form.
#[must_use]
pub fn join_labels(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Generate a URL-safe slug from a restaurant name.
///
/// Non-ASCII characters are dropped, spaces become dashes, and runs of dashes
/// collapse.
#[must_use]
pub fn slug_from_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                Some(c)
            } else if c == ' ' || c == '&' || c == '/' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
