use super::repository;
use contracts::domain::a003_quotation::aggregate::{Quotation, QuotationDto};
use contracts::shared::numbering::{DocumentSeries, SeriesFlags};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::error::DomainError;
use crate::shared::logger;
use crate::shared::numbering::{self, issue_with_retry, SequenceGenerator};

pub async fn create(dto: QuotationDto) -> anyhow::Result<Uuid> {
    create_with(
        get_connection(),
        numbering::get_generator(),
        numbering::max_insert_attempts(),
        dto,
    )
    .await
}

pub async fn create_with(
    db: &DatabaseConnection,
    generator: &SequenceGenerator,
    max_attempts: u32,
    dto: QuotationDto,
) -> anyhow::Result<Uuid> {
    let mut aggregate = Quotation::new_for_insert(&dto);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    let (issued, id) = issue_with_retry(
        generator,
        DocumentSeries::Quotation,
        &SeriesFlags::none(),
        max_attempts,
        |code| {
            let mut candidate = aggregate.clone();
            candidate.base.assign_code(code);
            async move { repository::insert(db, &candidate).await }
        },
    )
    .await?;

    tracing::info!("Quotation {} created as {}", id, issued.code);
    logger::log("numbering", &format!("Выдан номер {} (КП {})", issued.code, id));
    Ok(id)
}

pub async fn update(dto: QuotationDto) -> anyhow::Result<()> {
    update_with(get_connection(), dto).await
}

pub async fn update_with(db: &DatabaseConnection, dto: QuotationDto) -> anyhow::Result<()> {
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

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Quotation>> {
    repository::get_by_id(get_connection(), id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Quotation>> {
    repository::list_all(get_connection()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use crate::shared::numbering::generator::tests::generator_with;
    use crate::shared::numbering::series::tests::quotation_config;
    use contracts::shared::numbering::SequenceStrategy;

    fn dto() -> QuotationDto {
        QuotationDto {
            id: None,
            description: "Jakarta - Surabaya, 2x40HC".into(),
            customer_name: "CV Maju Jaya".into(),
            amount: 1850.0,
            currency: "USD".into(),
            valid_until: chrono::Utc::now().date_naive() + chrono::Duration::days(30),
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_quotation_code_has_no_separators() {
        let db = memory_connection().await;
        // ScanMax: номер берётся из уже сохранённых КП
        let gen = generator_with(&db, SequenceStrategy::ScanMax, &[quotation_config()]);
        let bucket = gen.today().format("%Y%m").to_string();

        create_with(&db, &gen, 3, dto()).await.unwrap();
        let id = create_with(&db, &gen, 3, dto()).await.unwrap();

        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.base.code, format!("QT{}0002", bucket));
    }

    #[tokio::test]
    async fn test_update_validates_against_creation_date() {
        let db = memory_connection().await;
        let gen = generator_with(&db, SequenceStrategy::Counter, &[quotation_config()]);
        let id = create_with(&db, &gen, 3, dto()).await.unwrap();

        let mut expired = dto();
        expired.id = Some(id.to_string());
        expired.valid_until = chrono::Utc::now().date_naive() - chrono::Duration::days(2);
        let err = update_with(&db, expired).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));

        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.base.metadata.version, 1);
    }
}
