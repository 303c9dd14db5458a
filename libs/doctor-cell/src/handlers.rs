use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityError, UpdateAvailabilityWindowRequest};
use crate::services::availability::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct AvailabilityCheckQuery {
    pub date: String,
    pub time: String,
}

fn storage_error(err: AvailabilityError) -> AppError {
    match err {
        AvailabilityError::Storage(e) => AppError::Database(e.to_string()),
        other => AppError::BadRequest(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let availability_service = AvailabilityService::new(&state);

    let availability = availability_service.get_availability(doctor_id, token).await
        .map_err(storage_error)?
        .ok_or_else(|| AppError::NotFound("Doctor not found or availability not set".to_string()))?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn update_availability_window(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateAvailabilityWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let availability_service = AvailabilityService::new(&state);

    let updated = availability_service.update_availability_window(
        doctor_id,
        &request.day_of_week,
        request.start_time,
        request.end_time,
        token,
    ).await.map_err(|e| match e {
        AvailabilityError::NoAvailabilityRecord => {
            AppError::NotFound("Doctor not found or availability not set".to_string())
        }
        AvailabilityError::InvalidWeekdayName(_) => {
            AppError::BadRequest("Invalid day of the week".to_string())
        }
        other => storage_error(other),
    })?;

    Ok(Json(json!({
        "message": format!("Doctor availability for {} updated successfully", request.day_of_week),
        "availability": updated,
    })))
}

#[axum::debug_handler]
pub async fn check_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityCheckQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d");
    let time = NaiveTime::parse_from_str(&query.time, "%H:%M");
    let (date, time) = match (date, time) {
        (Ok(date), Ok(time)) => (date, time),
        _ => return Err(AppError::BadRequest("Invalid date or time format".to_string())),
    };

    let availability_service = AvailabilityService::new(&state);

    let available = availability_service.check_availability(doctor_id, date, time, token).await
        .map_err(storage_error)?;

    Ok(Json(json!({ "available": available })))
}
