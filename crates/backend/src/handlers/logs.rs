use axum::extract::Query;
use axum::Json;
use contracts::shared::logger::{CreateLogRequest, LogEntry, LogQuery};

use crate::shared::logger;

/// GET /api/logs?category=numbering&limit=100
pub async fn list_all(
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<LogEntry>>, axum::http::StatusCode> {
    match logger::repository::get_logs(&query).await {
        Ok(logs) => Ok(Json(logs)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> axum::http::StatusCode {
    match logger::repository::log_event(&req.source, &req.category, &req.message).await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> axum::http::StatusCode {
    match logger::repository::clear_all_logs().await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}
