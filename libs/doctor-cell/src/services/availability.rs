use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;

use crate::models::{AvailabilityError, TimeWindow, Weekday, WeeklyAvailability};

pub struct AvailabilityService {
    db: PostgrestClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Fetch a doctor's weekly availability record, if one exists.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<WeeklyAvailability>, AvailabilityError> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctor_availability?doctor_id=eq.{}", doctor_id);
        let result: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        match result.into_iter().next() {
            Some(row) => {
                let availability: WeeklyAvailability = serde_json::from_value(row)
                    .map_err(anyhow::Error::new)?;
                Ok(Some(availability))
            }
            None => Ok(None),
        }
    }

    /// Admission check for a requested appointment timestamp. A doctor with no
    /// availability record at all is reported distinctly from a doctor who is
    /// closed on the requested day.
    pub async fn validate_appointment_slot(
        &self,
        doctor_id: Uuid,
        at: NaiveDateTime,
        auth_token: &str,
    ) -> Result<(), AvailabilityError> {
        let availability = self
            .get_availability(doctor_id, auth_token)
            .await?
            .ok_or(AvailabilityError::NoAvailabilityRecord)?;

        availability.validate_slot(at)
    }

    /// Boolean availability query. A missing availability record is still an
    /// error here; only closed-day and out-of-window collapse to `false`.
    pub async fn check_availability(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        auth_token: &str,
    ) -> Result<bool, AvailabilityError> {
        let availability = self
            .get_availability(doctor_id, auth_token)
            .await?
            .ok_or(AvailabilityError::NoAvailabilityRecord)?;

        Ok(availability.is_open_at(date, time))
    }

    /// Replace one weekday's window on an existing availability record. The
    /// weekday name is validated before anything is read or written.
    pub async fn update_availability_window(
        &self,
        doctor_id: Uuid,
        day_of_week: &str,
        start_time: NaiveTime,
        end_time: NaiveTime,
        auth_token: &str,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        let day: Weekday = day_of_week.parse()?;

        let mut availability = self
            .get_availability(doctor_id, auth_token)
            .await?
            .ok_or(AvailabilityError::NoAvailabilityRecord)?;

        availability.set_window(day, TimeWindow::new(start_time, end_time));

        debug!("Updating availability for doctor {} on {}", doctor_id, day);

        let path = format!("/rest/v1/doctor_availability?doctor_id=eq.{}", doctor_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.db.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "availability": availability.availability })),
            Some(headers),
        ).await?;

        let updated = result
            .into_iter()
            .next()
            .ok_or(AvailabilityError::NoAvailabilityRecord)?;

        let updated: WeeklyAvailability = serde_json::from_value(updated)
            .map_err(anyhow::Error::new)?;
        Ok(updated)
    }

    /// Create the default weekly schedule for a newly provisioned doctor.
    /// Records only ever come into existence here, never lazily on lookup.
    pub async fn create_default_availability(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        debug!("Creating default availability for doctor: {}", doctor_id);

        let availability_data = json!({
            "doctor_id": doctor_id,
            "availability": WeeklyAvailability::default_week(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.db.request_with_headers(
            Method::POST,
            "/rest/v1/doctor_availability",
            Some(auth_token),
            Some(availability_data),
            Some(headers),
        ).await?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create availability"))?;

        let created: WeeklyAvailability = serde_json::from_value(created)
            .map_err(anyhow::Error::new)?;
        Ok(created)
    }
}
