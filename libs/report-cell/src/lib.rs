pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Report, ReportError, UploadReportRequest};
pub use services::naming::{next_available_name, sequence_number, split_file_name};
pub use services::report::ReportService;
