use chrono::NaiveDateTime;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;
use doctor_cell::services::availability::AvailabilityService;

use crate::models::{Appointment, AppointmentError, CreateAppointmentRequest};

pub struct AppointmentBookingService {
    db: PostgrestClient,
    availability_service: AvailabilityService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            availability_service: AvailabilityService::new(config),
        }
    }

    /// Admit and persist an appointment request. Admission runs against the
    /// doctor's weekly template first, then against already-booked slots.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Creating appointment for patient {} with doctor {} at {}",
            request.patient_id, request.doctor_id, request.appointment_date
        );

        self.availability_service
            .validate_appointment_slot(request.doctor_id, request.appointment_date, auth_token)
            .await?;

        if self
            .slot_already_booked(request.doctor_id, request.appointment_date, auth_token)
            .await?
        {
            return Err(AppointmentError::SlotTaken);
        }

        let appointment_data = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "appointment_date": request.appointment_date,
            "reason": request.reason,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.db.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(appointment_data),
            Some(headers),
        ).await?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create appointment"))?;

        let appointment: Appointment = serde_json::from_value(created)
            .map_err(anyhow::Error::new)?;
        Ok(appointment)
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?patient_id=eq.{}", patient_id);
        self.fetch_appointments(&path, auth_token).await
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?doctor_id=eq.{}", doctor_id);
        self.fetch_appointments(&path, auth_token).await
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Canceling appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let existing: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        if existing.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let _: Vec<Value> = self.db.request(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(())
    }

    async fn slot_already_booked(
        &self,
        doctor_id: Uuid,
        at: NaiveDateTime,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        let timestamp = at.format("%Y-%m-%dT%H:%M:%S").to_string();
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}",
            doctor_id,
            urlencoding::encode(&timestamp),
        );

        let existing: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(!existing.is_empty())
    }

    async fn fetch_appointments(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self.db.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await?;

        let appointments: Vec<Appointment> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(anyhow::Error::new)?;

        Ok(appointments)
    }
}
