use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque on-disk name: "<uuid><ext>". Immutable once assigned.
    pub report_name: String,
    /// Human-facing name, unique within its base+extension family.
    pub report_display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReportRequest {
    pub user_id: Uuid,
    /// Original file name as uploaded, extension included.
    pub file_name: String,
    /// Base64-encoded file contents, with or without a data-URL prefix.
    pub file_data: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid format.Please Upload in pdf format.")]
    InvalidFormat,

    #[error("Invalid file data: {0}")]
    InvalidFileData(String),

    #[error("Report not found")]
    NotFound,

    #[error("Could not assign a unique display name")]
    NamingExhausted,

    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
