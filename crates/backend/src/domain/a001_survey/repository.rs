use chrono::Utc;
use contracts::domain::a001_survey::aggregate::{Survey, SurveyId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::shared::numbering::{ShipmentDetail, ShipmentType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_survey")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub shipment_type: String,
    pub shipment_detail: Option<String>,
    pub customer_name: String,
    pub location: String,
    pub survey_date: chrono::NaiveDate,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Survey {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Survey {
            base: BaseAggregate::with_metadata(
                SurveyId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            shipment_type: ShipmentType::parse(&m.shipment_type).unwrap_or(ShipmentType::Domestic),
            shipment_detail: m.shipment_detail.as_deref().and_then(ShipmentDetail::parse),
            customer_name: m.customer_name,
            location: m.location,
            survey_date: m.survey_date,
        }
    }
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Survey>> {
    let items: Vec<Survey> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<Survey>> {
    let result = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &Survey) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        shipment_type: Set(aggregate.shipment_type.as_str().to_string()),
        shipment_detail: Set(aggregate.shipment_detail.map(|d| d.as_str().to_string())),
        customer_name: Set(aggregate.customer_name.clone()),
        location: Set(aggregate.location.clone()),
        survey_date: Set(aggregate.survey_date),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

/// Номер и тип перевозки не перезаписываются
pub async fn update(db: &DatabaseConnection, aggregate: &Survey) -> anyhow::Result<()> {
    let id = aggregate.base.id.value().to_string();
    let active = ActiveModel {
        id: Set(id),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        customer_name: Set(aggregate.customer_name.clone()),
        location: Set(aggregate.location.clone()),
        survey_date: Set(aggregate.survey_date),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        code: sea_orm::ActiveValue::NotSet,
        shipment_type: sea_orm::ActiveValue::NotSet,
        shipment_detail: sea_orm::ActiveValue::NotSet,
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(db).await?;
    Ok(())
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use contracts::domain::a001_survey::aggregate::SurveyDto;

    fn survey(code: &str) -> Survey {
        let mut survey = Survey::new_for_insert(&SurveyDto {
            id: None,
            description: "20 pallets of ceramic tiles".into(),
            shipment_type: ShipmentType::Import,
            shipment_detail: Some(ShipmentDetail::Lcl),
            customer_name: "PT Samudra".into(),
            location: "Tanjung Priok, gate 3".into(),
            survey_date: chrono::NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(),
            comment: None,
        });
        survey.base.assign_code(code.into());
        survey
    }

    #[tokio::test]
    async fn test_update_never_writes_code_or_shipment_columns() {
        let db = memory_connection().await;
        let original = survey("SIL-20240001");
        insert(&db, &original).await.unwrap();

        let mut edited = original.clone();
        edited.base.code = "SIL-20249999".into();
        edited.shipment_type = ShipmentType::Export;
        edited.shipment_detail = None;
        edited.location = "Warehouse B".into();
        update(&db, &edited).await.unwrap();

        let stored = get_by_id(&db, original.base.id.value()).await.unwrap().unwrap();
        assert_eq!(stored.base.code, "SIL-20240001");
        assert_eq!(stored.shipment_type, ShipmentType::Import);
        assert_eq!(stored.shipment_detail, Some(ShipmentDetail::Lcl));
        assert_eq!(stored.location, "Warehouse B");
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_leave_the_list() {
        let db = memory_connection().await;
        let kept = survey("SIL-20240002");
        let deleted = survey("SIL-20240001");
        insert(&db, &kept).await.unwrap();
        insert(&db, &deleted).await.unwrap();

        assert!(soft_delete(&db, deleted.base.id.value()).await.unwrap());
        assert!(!soft_delete(&db, Uuid::new_v4()).await.unwrap());

        let codes: Vec<String> = list_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.base.code)
            .collect();
        assert_eq!(codes, vec!["SIL-20240002"]);

        let row = get_by_id(&db, deleted.base.id.value()).await.unwrap().unwrap();
        assert!(row.base.metadata.is_deleted);
    }
}
