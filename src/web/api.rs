//! REST API handlers for tracker control and usage data

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use usagewatch_core::api::{ApiError, TrackerCore};
use usagewatch_core::status::TrackerStatus;
use usagewatch_core::supervisor::StopOutcome;

/// Shared application state for API handlers
pub struct ApiState {
    pub core: Arc<TrackerCore>,
}

/// Reply to start/stop requests
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
}

impl ControlResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }

    fn failed(status: StatusCode, message: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                message: message.to_string(),
            }),
        )
    }
}

/// Reply to backup requests
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<String>,
    pub message: String,
}

/// Query string of the export endpoint
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Helper to create JSON error responses
fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(serde_json::json!({ "message": message })))
}

/// Log a server-side failure and pick the status code for it
fn error_status(context: &str, err: &ApiError) -> StatusCode {
    if err.is_client_error() {
        tracing::debug!("API: {}: {}", context, err);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("API: {}: {}", context, err);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// GET /api/ping
pub async fn ping() -> Json<Value> {
    Json(serde_json::json!({ "message": "pong" }))
}

/// GET /api/tracker/status
pub async fn get_status(State(state): State<Arc<ApiState>>) -> Json<TrackerStatus> {
    Json(state.core.status())
}

/// POST /api/tracker/start
pub async fn start_tracker(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ControlResponse>, (StatusCode, Json<ControlResponse>)> {
    match state.core.start_tracking() {
        Ok(()) => Ok(ControlResponse::ok("Tracker started successfully")),
        Err(ApiError::AlreadyRunning) => Err(ControlResponse::failed(
            StatusCode::BAD_REQUEST,
            "Tracker is already running",
        )),
        Err(e) => {
            let status = error_status("start failed", &e);
            Err(ControlResponse::failed(status, "Failed to start tracker"))
        }
    }
}

/// POST /api/tracker/stop
///
/// Stopping an already stopped tracker succeeds.
pub async fn stop_tracker(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ControlResponse>, (StatusCode, Json<ControlResponse>)> {
    match state.core.stop_tracking() {
        Ok(StopOutcome::Stopped) => Ok(ControlResponse::ok("Tracker stopped successfully")),
        Ok(StopOutcome::NotRunning) => Ok(ControlResponse::ok("Tracker is already stopped")),
        Err(e) => {
            let status = error_status("stop failed", &e);
            Err(ControlResponse::failed(status, "Failed to stop tracker"))
        }
    }
}

/// GET /api/tracker/data
pub async fn get_data(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.core.tracker_data() {
        Ok(Some(log)) => Ok(Json(log)),
        Ok(None) => Err(json_error(
            StatusCode::NOT_FOUND,
            "No tracker data available",
        )),
        Err(e) => Err(json_error(
            error_status("reading usage log", &e),
            "Failed to retrieve tracker data",
        )),
    }
}

/// GET /api/tracker/stats
pub async fn get_stats(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.core.tracker_stats() {
        Ok(Some(stats)) => Ok(Json(stats)),
        Ok(None) => Err(json_error(
            StatusCode::NOT_FOUND,
            "No statistics available",
        )),
        Err(e) => Err(json_error(
            error_status("reading stats file", &e),
            "Failed to retrieve statistics",
        )),
    }
}

/// GET /api/tracker/export?format=json|csv
///
/// Responds with an attachment named `usage_report_<date>.<ext>`.
pub async fn export_data(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let format = query.format.as_deref().unwrap_or("json");

    match state.core.export_data_named(format) {
        Ok(Some(report)) => {
            let disposition = format!("attachment; filename=\"{}\"", report.filename);
            Ok((
                [
                    (header::CONTENT_TYPE, report.format.content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                report.body,
            )
                .into_response())
        }
        Ok(None) => Err(json_error(StatusCode::NOT_FOUND, "No data to export")),
        Err(ApiError::UnsupportedFormat { format }) => {
            tracing::debug!("API: export requested in unsupported format {:?}", format);
            Err(json_error(
                StatusCode::BAD_REQUEST,
                "Unsupported export format (use json or csv)",
            ))
        }
        Err(e) => Err(json_error(
            error_status("export failed", &e),
            "Failed to export data",
        )),
    }
}

/// POST /api/tracker/backup
pub async fn create_backup(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BackupResponse>, (StatusCode, Json<BackupResponse>)> {
    match state.core.create_backup() {
        Ok(Some(info)) => Ok(Json(BackupResponse {
            success: true,
            backup_file: Some(info.path.display().to_string()),
            message: "Backup created successfully".to_string(),
        })),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(BackupResponse {
                success: false,
                backup_file: None,
                message: "No data to backup".to_string(),
            }),
        )),
        Err(e) => Err((
            error_status("backup failed", &e),
            Json(BackupResponse {
                success: false,
                backup_file: None,
                message: "Failed to create backup".to_string(),
            }),
        )),
    }
}
