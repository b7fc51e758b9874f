use chrono::Utc;
use contracts::domain::a002_material_transaction::aggregate::{
    MaterialDirection, MaterialTransaction, MaterialTransactionId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_material_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub direction: String,
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub warehouse: String,
    pub transaction_date: chrono::NaiveDate,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MaterialTransaction {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        MaterialTransaction {
            base: BaseAggregate::with_metadata(
                MaterialTransactionId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            direction: MaterialDirection::parse(&m.direction).unwrap_or(MaterialDirection::In),
            material_name: m.material_name,
            quantity: m.quantity,
            unit: m.unit,
            warehouse: m.warehouse,
            transaction_date: m.transaction_date,
        }
    }
}

pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<MaterialTransaction>> {
    let items: Vec<MaterialTransaction> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::TransactionDate)
        .order_by_desc(Column::Code)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<MaterialTransaction>> {
    let result = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert(db: &DatabaseConnection, aggregate: &MaterialTransaction) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        direction: Set(aggregate.direction.as_str().to_string()),
        material_name: Set(aggregate.material_name.clone()),
        quantity: Set(aggregate.quantity),
        unit: Set(aggregate.unit.clone()),
        warehouse: Set(aggregate.warehouse.clone()),
        transaction_date: Set(aggregate.transaction_date),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(db).await?;
    Ok(uuid)
}

pub async fn update(db: &DatabaseConnection, aggregate: &MaterialTransaction) -> anyhow::Result<()> {
    let id = aggregate.base.id.value().to_string();
    let active = ActiveModel {
        id: Set(id),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        material_name: Set(aggregate.material_name.clone()),
        quantity: Set(aggregate.quantity),
        unit: Set(aggregate.unit.clone()),
        warehouse: Set(aggregate.warehouse.clone()),
        transaction_date: Set(aggregate.transaction_date),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        code: sea_orm::ActiveValue::NotSet,
        direction: sea_orm::ActiveValue::NotSet,
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
