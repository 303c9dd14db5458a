use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::AvailabilityError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDateTime,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDateTime,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor already has an appointment at the selected time")]
    SlotTaken,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
