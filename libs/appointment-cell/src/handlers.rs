use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use doctor_cell::models::AvailabilityError;

use crate::models::{AppointmentError, CreateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

fn appointment_error(err: AppointmentError) -> AppError {
    match err {
        AppointmentError::Availability(AvailabilityError::Storage(e)) => {
            AppError::Database(e.to_string())
        }
        AppointmentError::Availability(e) => AppError::BadRequest(e.to_string()),
        AppointmentError::NotFound => AppError::NotFound(err.to_string()),
        AppointmentError::SlotTaken => AppError::Conflict(err.to_string()),
        AppointmentError::Storage(e) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.create_appointment(request, token).await
        .map_err(appointment_error)?;

    Ok(Json(json!({
        "message": "Appointment created successfully",
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.appointments_for_patient(patient_id, token).await
        .map_err(appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.appointments_for_doctor(doctor_id, token).await
        .map_err(appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let booking_service = AppointmentBookingService::new(&state);

    booking_service.cancel_appointment(appointment_id, token).await
        .map_err(appointment_error)?;

    Ok(Json(json!({ "message": "Appointment canceled successfully" })))
}
