pub mod a001_survey;
pub mod a002_material_transaction;
pub mod a003_quotation;
pub mod a004_customer;
pub mod logs;
pub mod sequences;

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::shared::error::DomainError;
use crate::shared::numbering::NumberingError;

/// Статус и тело ответа `{"error": "..."}`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn status_for(e: &anyhow::Error) -> StatusCode {
    if let Some(err) = e.downcast_ref::<DomainError>() {
        return match err {
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::InvalidId => StatusCode::BAD_REQUEST,
            DomainError::NotFound => StatusCode::NOT_FOUND,
        };
    }
    if let Some(err) = e.downcast_ref::<NumberingError>() {
        return numbering_status(err);
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

pub fn numbering_status(err: &NumberingError) -> StatusCode {
    match err {
        NumberingError::DuplicateCode(_) => StatusCode::CONFLICT,
        // серия исчерпана до смены периода
        NumberingError::Exhausted { .. } => StatusCode::CONFLICT,
        NumberingError::UnknownSeries(_) => StatusCode::NOT_FOUND,
        NumberingError::StoreUnavailable(_) | NumberingError::InvalidConfig { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn api_error(e: anyhow::Error) -> ApiError {
    let status = status_for(&e);
    if status.is_server_error() {
        tracing::error!("{:#}", e);
    } else {
        tracing::warn!("{} {}", status.as_u16(), e);
    }
    (status, Json(json!({ "error": e.to_string() })))
}

/// Разбор `:id` из пути
pub fn parse_id(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|_| api_error(DomainError::InvalidId.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::numbering::DocumentSeries;
    use sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DomainError::Validation("x".into()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(&DomainError::InvalidId.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&NumberingError::DuplicateCode("SD-20240004".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&NumberingError::UnknownSeries(DocumentSeries::Quotation).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&NumberingError::StoreUnavailable(DbErr::Custom("down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_conflict_body_asks_to_retry() {
        let (status, Json(body)) =
            api_error(NumberingError::DuplicateCode("SD-20240004".into()).into());
        assert_eq!(status, StatusCode::CONFLICT);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("SD-20240004"));
        assert!(message.ends_with("please retry"));
    }

    #[test]
    fn test_exhausted_series_is_a_conflict() {
        let (status, Json(body)) = api_error(
            NumberingError::Exhausted {
                prefix: "SD-2024".into(),
                width: 4,
            }
            .into(),
        );
        assert_eq!(status, StatusCode::CONFLICT);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("SD-2024"));
        assert!(message.contains("exhausted"));
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&uuid::Uuid::new_v4().to_string()).is_ok());
    }
}
