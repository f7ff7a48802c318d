//! Request and response bodies of the REST API.
//!
//! Requests arrive in camelCase and are turned into service commands here;
//! responses reuse the serialisable domain records directly.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::crops::{CreateCropCommand, UpdateCropCommand};
use crate::application::farm_crops::{CreateFarmCropCommand, UpdateFarmCropCommand};
use crate::application::farms::{CreateFarmCommand, UpdateFarmCommand};
use crate::application::harvests::{CreateHarvestCommand, UpdateHarvestCommand};
use crate::application::pagination::parse_timestamp;
use crate::application::producers::{CreateProducerCommand, UpdateProducerCommand};

use super::error::{ApiError, codes};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerCreateRequest {
    pub cpf_cnpj: String,
    pub producer_name: String,
}

impl From<ProducerCreateRequest> for CreateProducerCommand {
    fn from(request: ProducerCreateRequest) -> Self {
        Self {
            cpf_cnpj: request.cpf_cnpj,
            producer_name: request.producer_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerUpdateRequest {
    pub cpf_cnpj: Option<String>,
    pub producer_name: Option<String>,
}

impl From<ProducerUpdateRequest> for UpdateProducerCommand {
    fn from(request: ProducerUpdateRequest) -> Self {
        Self {
            cpf_cnpj: request.cpf_cnpj,
            producer_name: request.producer_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmCreateRequest {
    pub farm_name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agriculturable_area: f64,
    pub vegetation_area: f64,
    pub producer_id: Uuid,
}

impl From<FarmCreateRequest> for CreateFarmCommand {
    fn from(request: FarmCreateRequest) -> Self {
        Self {
            farm_name: request.farm_name,
            city: request.city,
            state: request.state,
            total_area: request.total_area,
            agriculturable_area: request.agriculturable_area,
            vegetation_area: request.vegetation_area,
            producer_id: request.producer_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdateRequest {
    pub farm_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_area: Option<f64>,
    pub agriculturable_area: Option<f64>,
    pub vegetation_area: Option<f64>,
    pub producer_id: Option<Uuid>,
}

impl From<FarmUpdateRequest> for UpdateFarmCommand {
    fn from(request: FarmUpdateRequest) -> Self {
        Self {
            farm_name: request.farm_name,
            city: request.city,
            state: request.state,
            total_area: request.total_area,
            agriculturable_area: request.agriculturable_area,
            vegetation_area: request.vegetation_area,
            producer_id: request.producer_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropCreateRequest {
    pub crop_name: String,
    pub description: Option<String>,
}

impl From<CropCreateRequest> for CreateCropCommand {
    fn from(request: CropCreateRequest) -> Self {
        Self {
            crop_name: request.crop_name,
            description: request.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropUpdateRequest {
    pub crop_name: Option<String>,
    pub description: Option<String>,
}

impl From<CropUpdateRequest> for UpdateCropCommand {
    fn from(request: CropUpdateRequest) -> Self {
        Self {
            crop_name: request.crop_name,
            description: request.description,
        }
    }
}

/// Season dates accept RFC 3339 timestamps or plain `YYYY-MM-DD` days.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestCreateRequest {
    pub harvest_name: String,
    pub harvest_year: i32,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl HarvestCreateRequest {
    pub fn into_command(self) -> Result<CreateHarvestCommand, ApiError> {
        Ok(CreateHarvestCommand {
            harvest_name: self.harvest_name,
            harvest_year: self.harvest_year,
            start_date: parse_date("startDate", self.start_date)?,
            end_date: parse_date("endDate", self.end_date)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestUpdateRequest {
    pub harvest_name: Option<String>,
    pub harvest_year: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl HarvestUpdateRequest {
    pub fn into_command(self) -> Result<UpdateHarvestCommand, ApiError> {
        Ok(UpdateHarvestCommand {
            harvest_name: self.harvest_name,
            harvest_year: self.harvest_year,
            start_date: parse_date("startDate", self.start_date)?,
            end_date: parse_date("endDate", self.end_date)?,
        })
    }
}

fn parse_date(field: &str, raw: Option<String>) -> Result<Option<OffsetDateTime>, ApiError> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    parse_timestamp(&raw).map(Some).ok_or_else(|| {
        ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            format!("Invalid date for `{field}`"),
            Some(raw),
        )
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmCropCreateRequest {
    pub farm_id: Uuid,
    pub crop_id: Uuid,
    pub harvest_id: Uuid,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

impl From<FarmCropCreateRequest> for CreateFarmCropCommand {
    fn from(request: FarmCropCreateRequest) -> Self {
        Self {
            farm_id: request.farm_id,
            crop_id: request.crop_id,
            harvest_id: request.harvest_id,
            planted_area: request.planted_area,
            expected_yield: request.expected_yield,
            actual_yield: request.actual_yield,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmCropUpdateRequest {
    pub farm_id: Option<Uuid>,
    pub crop_id: Option<Uuid>,
    pub harvest_id: Option<Uuid>,
    pub planted_area: Option<f64>,
    pub expected_yield: Option<f64>,
    pub actual_yield: Option<f64>,
}

impl From<FarmCropUpdateRequest> for UpdateFarmCropCommand {
    fn from(request: FarmCropUpdateRequest) -> Self {
        Self {
            farm_id: request.farm_id,
            crop_id: request.crop_id,
            harvest_id: request.harvest_id,
            planted_area: request.planted_area,
            expected_yield: request.expected_yield,
            actual_yield: request.actual_yield,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalHectaresResponse {
    pub total_hectares: f64,
}
