use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::{ApiError, PostgrestClient};

use crate::models::{Report, ReportError, UploadReportRequest};
use crate::services::naming::{next_available_name, split_file_name};

/// Attempts to persist a report row before giving up on display-name
/// contention. Each retry re-reads the family and recomputes the name.
const NAMING_ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
struct DisplayNameRow {
    report_display_name: String,
}

pub struct ReportService {
    db: PostgrestClient,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            reports_dir: PathBuf::from(&config.reports_dir),
        }
    }

    /// Store an uploaded report: pick a collision-free display name, persist
    /// the metadata row, then write the bytes under the opaque storage name.
    pub async fn upload_report(
        &self,
        request: UploadReportRequest,
        auth_token: &str,
    ) -> Result<Report, ReportError> {
        let (base, ext) = split_file_name(&request.file_name);

        if !ext.eq_ignore_ascii_case(".pdf") {
            return Err(ReportError::InvalidFormat);
        }

        let file_data = decode_file_data(&request.file_data)?;

        let file_id = Uuid::new_v4();
        let report_name = format!("{}{}", file_id, ext);

        debug!("Uploading report {} for user {}", request.file_name, request.user_id);

        let report = self
            .insert_with_unique_display_name(file_id, &request, &base, &ext, &report_name, auth_token)
            .await?;

        fs::create_dir_all(&self.reports_dir).await?;
        fs::write(self.reports_dir.join(&report_name), &file_data).await?;

        Ok(report)
    }

    pub async fn reports_for_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Report>, ReportError> {
        let path = format!("/rest/v1/reports?user_id=eq.{}", user_id);
        let result: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let reports: Vec<Report> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Report>, _>>()
            .map_err(anyhow::Error::new)?;

        Ok(reports)
    }

    /// Delete the stored file (when present) and the metadata row.
    pub async fn delete_report(
        &self,
        report_id: Uuid,
        auth_token: &str,
    ) -> Result<(), ReportError> {
        debug!("Deleting report: {}", report_id);

        let path = format!("/rest/v1/reports?id=eq.{}", report_id);
        let existing: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let row = existing.into_iter().next().ok_or(ReportError::NotFound)?;
        let report: Report = serde_json::from_value(row).map_err(anyhow::Error::new)?;

        match fs::remove_file(self.reports_dir.join(&report.report_name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Stored file for report {} was already gone", report_id);
            }
            Err(e) => return Err(e.into()),
        }

        let _: Vec<Value> = self.db.request(
            Method::DELETE,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(())
    }

    /// Display names that contain `base` as a substring; the numbering logic
    /// filters this down to actual family members.
    async fn find_display_names_containing(
        &self,
        base: &str,
        auth_token: &str,
    ) -> Result<Vec<String>, ReportError> {
        let path = format!(
            "/rest/v1/reports?report_display_name=like.*{}*&select=report_display_name",
            urlencoding::encode(base),
        );

        let rows: Vec<DisplayNameRow> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(rows.into_iter().map(|row| row.report_display_name).collect())
    }

    /// Insert the metadata row, recomputing the display name and retrying
    /// when the storage-level uniqueness constraint rejects it. Name choice
    /// and insert are not atomic, so a concurrent upload can win the race;
    /// the 409 from storage is the signal to re-read and try again.
    async fn insert_with_unique_display_name(
        &self,
        file_id: Uuid,
        request: &UploadReportRequest,
        base: &str,
        ext: &str,
        report_name: &str,
        auth_token: &str,
    ) -> Result<Report, ReportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        for _ in 0..NAMING_ATTEMPTS {
            let existing = self.find_display_names_containing(base, auth_token).await?;
            let display_name = next_available_name(base, ext, &existing);

            let report_data = json!({
                "id": file_id,
                "user_id": request.user_id,
                "report_name": report_name,
                "report_display_name": display_name,
            });

            let result: Result<Vec<Value>, anyhow::Error> = self.db.request_with_headers(
                Method::POST,
                "/rest/v1/reports",
                Some(auth_token),
                Some(report_data),
                Some(headers.clone()),
            ).await;

            match result {
                Ok(rows) => {
                    let row = rows
                        .into_iter()
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("Failed to create report record"))?;
                    let report: Report = serde_json::from_value(row)
                        .map_err(anyhow::Error::new)?;
                    return Ok(report);
                }
                Err(e) => {
                    let conflict = e
                        .downcast_ref::<ApiError>()
                        .map(|api| api.status == 409)
                        .unwrap_or(false);
                    if !conflict {
                        return Err(e.into());
                    }
                    warn!("Display name {} taken concurrently, recomputing", display_name);
                }
            }
        }

        Err(ReportError::NamingExhausted)
    }
}

fn decode_file_data(file_data: &str) -> Result<Vec<u8>, ReportError> {
    let base64_data = if file_data.contains(";base64,") {
        file_data.split(";base64,").nth(1).unwrap_or(file_data)
    } else {
        file_data
    };

    BASE64
        .decode(base64_data)
        .map_err(|e| ReportError::InvalidFileData(e.to_string()))
}
