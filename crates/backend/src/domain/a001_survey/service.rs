use super::repository;
use contracts::domain::a001_survey::aggregate::{Survey, SurveyDto};
use contracts::shared::numbering::DocumentSeries;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::error::DomainError;
use crate::shared::logger;
use crate::shared::numbering::{self, issue_with_retry, SequenceGenerator};

pub async fn create(dto: SurveyDto) -> anyhow::Result<Uuid> {
    create_with(
        get_connection(),
        numbering::get_generator(),
        numbering::max_insert_attempts(),
        dto,
    )
    .await
}

/// Номер выдаётся только после успешной валидации
pub async fn create_with(
    db: &DatabaseConnection,
    generator: &SequenceGenerator,
    max_attempts: u32,
    dto: SurveyDto,
) -> anyhow::Result<Uuid> {
    let mut aggregate = Survey::new_for_insert(&dto);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    let (issued, id) = issue_with_retry(
        generator,
        DocumentSeries::Survey,
        &aggregate.series_flags(),
        max_attempts,
        |code| {
            let mut candidate = aggregate.clone();
            candidate.base.assign_code(code);
            async move { repository::insert(db, &candidate).await }
        },
    )
    .await?;

    tracing::info!("Survey {} created as {}", id, issued.code);
    logger::log("numbering", &format!("Выдан номер {} (акт осмотра {})", issued.code, id));
    Ok(id)
}

pub async fn update(dto: SurveyDto) -> anyhow::Result<()> {
    update_with(get_connection(), dto).await
}

pub async fn update_with(db: &DatabaseConnection, dto: SurveyDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(DomainError::InvalidId)?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or(DomainError::NotFound)?;

    aggregate.update(&dto);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::update(db, &aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(get_connection(), id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Survey>> {
    repository::get_by_id(get_connection(), id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Survey>> {
    repository::list_all(get_connection()).await
}
