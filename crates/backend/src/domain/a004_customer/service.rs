use super::repository;
use contracts::domain::a004_customer::aggregate::{Customer, CustomerDto};
use contracts::shared::numbering::{DocumentSeries, SeriesFlags};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::error::DomainError;
use crate::shared::logger;
use crate::shared::numbering::{self, issue_with_retry, SequenceGenerator};

pub async fn create(dto: CustomerDto) -> anyhow::Result<Uuid> {
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
    dto: CustomerDto,
) -> anyhow::Result<Uuid> {
    let mut aggregate = Customer::new_for_insert(&dto);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    let (issued, id) = issue_with_retry(
        generator,
        DocumentSeries::Customer,
        &SeriesFlags::none(),
        max_attempts,
        |code| {
            let mut candidate = aggregate.clone();
            candidate.base.assign_code(code);
            async move { repository::insert(db, &candidate).await }
        },
    )
    .await?;

    tracing::info!("Customer {} created as {}", id, issued.code);
    logger::log("numbering", &format!("Выдан код клиента {}", issued.code));
    Ok(id)
}

pub async fn update(dto: CustomerDto) -> anyhow::Result<()> {
    update_with(get_connection(), dto).await
}

pub async fn update_with(db: &DatabaseConnection, dto: CustomerDto) -> anyhow::Result<()> {
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

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Customer>> {
    repository::get_by_id(get_connection(), id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Customer>> {
    repository::list_all(get_connection()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use crate::shared::numbering::generator::tests::generator;
    use contracts::shared::numbering::SequenceStrategy;

    fn dto(name: &str) -> CustomerDto {
        CustomerDto {
            description: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_counter_continues_after_imported_customers() {
        let db = memory_connection().await;
        let gen = generator(&db, SequenceStrategy::Counter);

        // справочник перенесён из старой системы вместе с кодами
        let mut imported = Customer::new_for_insert(&dto("PT Lama"));
        imported.base.assign_code("CUS-00120".into());
        repository::insert(&db, &imported).await.unwrap();

        let id = create_with(&db, &gen, 3, dto("PT Samudra Logistik")).await.unwrap();
        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.base.code, "CUS-00121");
    }

    #[tokio::test]
    async fn test_deleted_customer_keeps_its_code() {
        let db = memory_connection().await;
        let gen = generator(&db, SequenceStrategy::ScanMax);

        let first = create_with(&db, &gen, 3, dto("CV Maju Jaya")).await.unwrap();
        assert!(repository::soft_delete(&db, first).await.unwrap());

        // удалённая запись остаётся в таблице, её код не переиспользуется
        let second = create_with(&db, &gen, 3, dto("PT Samudra")).await.unwrap();
        let stored = repository::get_by_id(&db, second).await.unwrap().unwrap();
        assert_eq!(stored.base.code, "CUS-00002");

        let listed: Vec<String> = repository::list_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.base.code)
            .collect();
        assert_eq!(listed, vec!["CUS-00002"]);
    }
}
