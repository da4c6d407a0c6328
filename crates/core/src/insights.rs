//! Vector insight rows produced by the embedding rebuild job.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One embedding per `(tenant_id, geo_id)` pair; overwritten in place on
/// rebuild, never appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorInsight {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub geo_id: String,
    pub embedding: Vec<f32>,
    pub metadata: Option<Value>,
}
