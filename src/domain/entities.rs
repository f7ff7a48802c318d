//! Domain entities mirrored from persistent storage.
//!
//! Records are serialised with camelCase keys; the same representation is used
//! for HTTP responses and for cached values.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerRecord {
    pub id: Uuid,
    pub cpf_cnpj: String,
    pub producer_name: String,
    #[serde(default)]
    pub farms: Vec<FarmRecord>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRecord {
    pub id: Uuid,
    pub farm_name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agriculturable_area: f64,
    pub vegetation_area: f64,
    pub producer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
    pub id: Uuid,
    pub crop_name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRecord {
    pub id: Uuid,
    pub harvest_name: String,
    pub harvest_year: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A crop planted on a farm during a harvest season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmCropRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub crop_id: Uuid,
    pub harvest_id: Uuid,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmsByState {
    pub state: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropStats {
    pub crop_name: String,
    pub count: u64,
    pub total_area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandUse {
    #[serde(rename = "type")]
    pub kind: String,
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_farms: u64,
    pub total_producers: u64,
    pub total_hectares: f64,
    pub farms_by_state: Vec<FarmsByState>,
    pub crop_stats: Vec<CropStats>,
    pub land_use: Vec<LandUse>,
}
