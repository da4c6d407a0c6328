//! Business density source client backed by the Overpass API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use etl_core::{BusinessDensityRow, Error, Result};

use crate::config::{BusinessTypeSpec, SourceConfig};
use crate::traits::BusinessDensitySource;
use crate::city_slug;

/// Fetches business counts for a city by querying Overpass once per
/// configured business type.
///
/// A non-2xx response for any type aborts the whole fetch; the job never
/// sees partial results for a city.
pub struct OverpassBusinessDensitySource {
    config: SourceConfig,
    http_client: reqwest::Client,
}

impl OverpassBusinessDensitySource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.overpass_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::source_fetch(format!("http client build failed: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Business types from `options.business_types` when well-formed and
    /// non-empty, else the configured default table. Malformed entries are
    /// skipped, not fatal.
    fn resolve_business_types(
        &self,
        options: &Map<String, Value>,
    ) -> BTreeMap<String, BusinessTypeSpec> {
        if let Some(user_specs) = options.get("business_types").and_then(Value::as_object) {
            let mut resolved = BTreeMap::new();
            for (name, spec) in user_specs {
                let (Some(tag_key), Some(tag_value)) = (
                    spec.get("tag_key").and_then(Value::as_str),
                    spec.get("tag_value").and_then(Value::as_str),
                ) else {
                    continue;
                };
                resolved.insert(name.clone(), BusinessTypeSpec::new(tag_key, tag_value));
            }
            if !resolved.is_empty() {
                return resolved;
            }
        }

        self.config.business_types.clone()
    }

    fn build_query(&self, city: &str, spec: &BusinessTypeSpec) -> String {
        let escaped_city = city.replace('"', "\\\"");
        let timeout = self.config.overpass_query_timeout_secs;
        let BusinessTypeSpec { tag_key, tag_value } = spec;

        format!(
            r#"
            [out:json][timeout:{timeout}];
            area["name"="{escaped_city}"]["boundary"="administrative"]->.searchArea;
            (
              node["{tag_key}"="{tag_value}"](area.searchArea);
              way["{tag_key}"="{tag_value}"](area.searchArea);
              relation["{tag_key}"="{tag_value}"](area.searchArea);
            );
            out center;
            "#
        )
    }

    /// Coordinate samples in response order, capped at the configured
    /// maximum. Elements without a resolvable position are skipped.
    fn extract_coordinates(&self, elements: &[Value]) -> Vec<Value> {
        let mut coordinates = Vec::new();

        for element in elements {
            let (lat, lon) = match (position_of(element, "lat"), position_of(element, "lon")) {
                (Some(lat), Some(lon)) => (lat, lon),
                _ => continue,
            };

            coordinates.push(json!({
                "id": element.get("id").cloned().unwrap_or(Value::Null),
                "lat": lat,
                "lon": lon,
                "type": element.get("type").cloned().unwrap_or(Value::Null),
            }));

            if coordinates.len() >= self.config.max_coordinate_samples {
                break;
            }
        }

        coordinates
    }
}

/// Position field of an element: top-level `lat`/`lon` for nodes, the
/// `center` object for ways and relations.
fn position_of(element: &Value, field: &str) -> Option<f64> {
    element
        .get(field)
        .and_then(Value::as_f64)
        .or_else(|| element.get("center")?.get(field)?.as_f64())
}

#[async_trait]
impl BusinessDensitySource for OverpassBusinessDensitySource {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<BusinessDensityRow>> {
        let city = city
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::validation("city is required for business density ingestion"))?;

        let resolved_country = country.unwrap_or(&self.config.default_country).to_string();
        let business_types = self.resolve_business_types(options);
        let city_geo_id = format!("{}-{}", city_slug(city), self.config.city_geo_id_suffix);

        let mut rows = Vec::with_capacity(business_types.len());

        for (business_type, spec) in &business_types {
            let query = self.build_query(city, spec);

            let response = self
                .http_client
                .post(&self.config.overpass_endpoint)
                .body(query)
                .send()
                .await
                .map_err(|e| Error::source_fetch(format!("overpass request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(Error::source_fetch(format!(
                    "overpass returned {} for business type {business_type}",
                    response.status()
                )));
            }

            let payload: Value = response
                .json()
                .await
                .map_err(|e| Error::source_fetch(format!("overpass response malformed: {e}")))?;

            let elements = payload
                .get("elements")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let coordinates = self.extract_coordinates(&elements);

            debug!(
                city = %city,
                business_type = %business_type,
                element_count = elements.len(),
                "Fetched business density elements"
            );

            rows.push(BusinessDensityRow {
                tenant_id: None,
                geo_id: city_geo_id.clone(),
                country: resolved_country.clone(),
                city: city.to_string(),
                business_type: business_type.clone(),
                count: Some(elements.len() as i64),
                density_score: None,
                coordinates: if coordinates.is_empty() {
                    None
                } else {
                    Some(Value::Array(coordinates))
                },
            });
        }

        Ok(rows)
    }
}
