use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Permission, User};
use shared_models::error::AppError;
use shared_utils::permissions::require_any;

use crate::models::{ReportError, UploadReportRequest};
use crate::services::report::ReportService;

fn report_error(err: ReportError) -> AppError {
    match err {
        ReportError::InvalidFormat | ReportError::InvalidFileData(_) => {
            AppError::BadRequest(err.to_string())
        }
        ReportError::NotFound => AppError::NotFound(err.to_string()),
        ReportError::NamingExhausted => AppError::Conflict(err.to_string()),
        ReportError::Io(e) => AppError::Internal(e.to_string()),
        ReportError::Storage(e) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn upload_report(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UploadReportRequest>,
) -> Result<Json<Value>, AppError> {
    require_any(&user, &[Permission::Admin])?;

    let token = auth.token();
    let report_service = ReportService::new(&state);

    let report = report_service.upload_report(request, token).await
        .map_err(report_error)?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn get_user_reports(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let report_service = ReportService::new(&state);

    let reports = report_service.reports_for_user(user_id, token).await
        .map_err(report_error)?;

    Ok(Json(json!(reports)))
}

#[axum::debug_handler]
pub async fn delete_report(
    State(state): State<Arc<AppConfig>>,
    Path(report_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any(&user, &[Permission::Admin])?;

    let token = auth.token();
    let report_service = ReportService::new(&state);

    report_service.delete_report(report_id, token).await
        .map_err(report_error)?;

    Ok(Json(json!({ "message": "Report deleted successfully" })))
}
