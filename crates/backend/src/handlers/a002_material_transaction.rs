use axum::{extract::Path, Json};
use serde_json::json;

use super::{api_error, parse_id, ApiError};
use crate::domain::a002_material_transaction;
use crate::shared::error::DomainError;

/// GET /api/material_transaction
pub async fn list_all(
) -> Result<Json<Vec<contracts::domain::a002_material_transaction::aggregate::MaterialTransaction>>, ApiError> {
    a002_material_transaction::service::list_all()
        .await
        .map(Json)
        .map_err(api_error)
}

/// GET /api/material_transaction/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a002_material_transaction::aggregate::MaterialTransaction>, ApiError> {
    let uuid = parse_id(&id)?;
    match a002_material_transaction::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(api_error(DomainError::NotFound.into())),
        Err(e) => Err(api_error(e)),
    }
}

/// POST /api/material_transaction
pub async fn upsert(
    Json(dto): Json<contracts::domain::a002_material_transaction::aggregate::MaterialTransactionDto>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a002_material_transaction::service::update(dto).await.map(|_| id)
    } else {
        a002_material_transaction::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => Err(api_error(e)),
    }
}

/// DELETE /api/material_transaction/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), ApiError> {
    let uuid = parse_id(&id)?;
    match a002_material_transaction::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(api_error(DomainError::NotFound.into())),
        Err(e) => Err(api_error(e)),
    }
}
