//! Source client configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag pair used to build one point-of-interest provider query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTypeSpec {
    pub tag_key: String,
    pub tag_value: String,
}

impl BusinessTypeSpec {
    pub fn new(tag_key: impl Into<String>, tag_value: impl Into<String>) -> Self {
        Self {
            tag_key: tag_key.into(),
            tag_value: tag_value.into(),
        }
    }
}

/// Source client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Overpass API endpoint
    #[serde(default = "default_overpass_endpoint")]
    pub overpass_endpoint: String,
    /// HTTP client timeout in seconds
    #[serde(default = "default_overpass_timeout_secs")]
    pub overpass_timeout_secs: u64,
    /// Per-query timeout passed into the Overpass QL template
    #[serde(default = "default_overpass_query_timeout_secs")]
    pub overpass_query_timeout_secs: u64,
    /// User-Agent header for provider requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Cap on coordinate samples kept per business type
    #[serde(default = "default_max_coordinate_samples")]
    pub max_coordinate_samples: usize,
    /// Country code used when the payload omits one
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Suffix appended to the city slug to form the city-level geo_id
    #[serde(default = "default_city_geo_id_suffix")]
    pub city_geo_id_suffix: String,
    /// Default business-type table when the payload supplies none
    #[serde(default = "default_business_types")]
    pub business_types: BTreeMap<String, BusinessTypeSpec>,
}

fn default_overpass_endpoint() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_timeout_secs() -> u64 {
    30
}

fn default_overpass_query_timeout_secs() -> u64 {
    25
}

fn default_user_agent() -> String {
    "marketscope-etl/1.0".to_string()
}

fn default_max_coordinate_samples() -> usize {
    50
}

fn default_country() -> String {
    "NA".to_string()
}

fn default_city_geo_id_suffix() -> String {
    "city".to_string()
}

fn default_business_types() -> BTreeMap<String, BusinessTypeSpec> {
    BTreeMap::from([
        ("cafes".to_string(), BusinessTypeSpec::new("amenity", "cafe")),
        (
            "restaurants".to_string(),
            BusinessTypeSpec::new("amenity", "restaurant"),
        ),
        (
            "gyms".to_string(),
            BusinessTypeSpec::new("leisure", "fitness_centre"),
        ),
    ])
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            overpass_endpoint: default_overpass_endpoint(),
            overpass_timeout_secs: default_overpass_timeout_secs(),
            overpass_query_timeout_secs: default_overpass_query_timeout_secs(),
            user_agent: default_user_agent(),
            max_coordinate_samples: default_max_coordinate_samples(),
            default_country: default_country(),
            city_geo_id_suffix: default_city_geo_id_suffix(),
            business_types: default_business_types(),
        }
    }
}
