//! Source clients for the marketscope datasets.
//!
//! One trait per dataset; the business-density client talks to a geocoded
//! point-of-interest provider (Overpass), the others are deterministic
//! local generators that keep the pipeline exercisable without live
//! external dependencies. A production deployment swaps a stub for a real
//! provider client without touching the ETL jobs.

pub mod config;
pub mod overpass;
pub mod stubs;
pub mod traits;

pub use config::{BusinessTypeSpec, SourceConfig};
pub use overpass::OverpassBusinessDensitySource;
pub use stubs::{StubDemographicsSource, StubLabourStatsSource, StubSpendingSource};
pub use traits::{BusinessDensitySource, DemographicsSource, LabourStatsSource, SpendingSource};

/// Slug form of a city name used to derive `geo_id`s:
/// lower-cased, trimmed, spaces collapsed to hyphens.
pub fn city_slug(city: &str) -> String {
    city.trim().to_lowercase().replace(' ', "-")
}
