//! Storage handle and repositories for the marketscope pipeline.
//!
//! Repositories implement keyed upserts over the normalized market tables:
//! look up by natural key, update everything outside the key and
//! `tenant_id`, insert otherwise. Safe to replay under at-least-once
//! delivery. The trait seams let jobs run against fakes in tests.

pub mod business_density;
pub mod demographics;
pub mod etl_log;
pub mod freshness;
pub mod labour_stats;
pub mod schema;
pub mod spending;
pub mod store;
pub mod traits;
pub mod vector;

pub use business_density::BusinessDensityRepository;
pub use demographics::DemographicsRepository;
pub use etl_log::EtlLogRepository;
pub use freshness::DataFreshnessRepository;
pub use labour_stats::LabourStatsRepository;
pub use spending::SpendingRepository;
pub use store::Store;
pub use traits::{
    AuditLogger, BusinessDensityStore, DemographicsStore, FreshnessTracker, LabourStatsStore,
    SpendingStore, VectorStore,
};
pub use vector::VectorInsightsRepository;
