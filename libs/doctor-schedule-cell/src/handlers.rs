use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityGridRequest, AvailabilityRequest, CandidateSlotsQuery};
use crate::services::availability::AvailabilityService;

// Misconfigured defaults are a server fault, not a bad request.
fn service_from_config(config: &AppConfig) -> Result<AvailabilityService, AppError> {
    AvailabilityService::new(config)
        .map_err(|e| AppError::Internal(format!("Schedule defaults misconfigured: {}", e)))
}

#[axum::debug_handler]
pub async fn get_schedule_defaults(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let availability_service = service_from_config(&state)?;

    let defaults = availability_service
        .defaults()
        .ok_or_else(|| AppError::NotFound("Schedule defaults are disabled".to_string()))?;

    Ok(Json(json!(defaults)))
}

#[axum::debug_handler]
pub async fn get_candidate_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<CandidateSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = service_from_config(&state)?;

    let slots = availability_service.candidate_slots(query)?;

    Ok(Json(json!({
        "total_slots": slots.len(),
        "slots": slots,
    })))
}

#[axum::debug_handler]
pub async fn compute_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let availability_service = service_from_config(&state)?;

    let availability = availability_service.get_doctor_availability(request)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn compute_availability_grid(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AvailabilityGridRequest>,
) -> Result<Json<Value>, AppError> {
    let availability_service = service_from_config(&state)?;

    let grid = availability_service.get_availability_grid(request)?;

    Ok(Json(json!(grid)))
}
