use axum::{extract::Path, Json};
use serde_json::json;

use super::{api_error, parse_id, ApiError};
use crate::domain::a004_customer;
use crate::shared::error::DomainError;

/// GET /api/customer
pub async fn list_all(
) -> Result<Json<Vec<contracts::domain::a004_customer::aggregate::Customer>>, ApiError> {
    a004_customer::service::list_all()
        .await
        .map(Json)
        .map_err(api_error)
}

/// GET /api/customer/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a004_customer::aggregate::Customer>, ApiError> {
    let uuid = parse_id(&id)?;
    match a004_customer::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(api_error(DomainError::NotFound.into())),
        Err(e) => Err(api_error(e)),
    }
}

/// POST /api/customer
pub async fn upsert(
    Json(dto): Json<contracts::domain::a004_customer::aggregate::CustomerDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a004_customer::service::update(dto).await.map(|_| id)
    } else {
        a004_customer::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => Err(api_error(e)),
    }
}

/// DELETE /api/customer/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), ApiError> {
    let uuid = parse_id(&id)?;
    match a004_customer::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(api_error(DomainError::NotFound.into())),
        Err(e) => Err(api_error(e)),
    }
}
