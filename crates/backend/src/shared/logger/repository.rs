use chrono::Utc;
use contracts::shared::logger::{LogEntry, LogQuery};
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::{get_connection, try_get_connection};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            category: m.category,
            message: m.message,
        }
    }
}

const DEFAULT_LIMIT: u64 = 500;

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Добавить запись в лог в фоне. До инициализации БД запись пропускается.
pub fn log_event_internal(source: &str, category: &str, message: &str) {
    let Some(db) = try_get_connection() else {
        tracing::debug!("system_log skipped ({}): {}", category, message);
        return;
    };
    let source = source.to_string();
    let category = category.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        if let Err(e) = insert_event(db, &source, &category, &message).await {
            tracing::error!("Failed to log event: {}", e);
        }
    });
}

/// Добавить запись в лог
pub async fn log_event(source: &str, category: &str, message: &str) -> anyhow::Result<()> {
    insert_event(conn(), source, category, message).await
}

async fn insert_event(
    db: &DatabaseConnection,
    source: &str,
    category: &str,
    message: &str,
) -> anyhow::Result<()> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now),
        source: Set(source.to_string()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
    };

    active.insert(db).await?;
    Ok(())
}

/// Записи лога, новые сверху
pub async fn get_logs(query: &LogQuery) -> anyhow::Result<Vec<LogEntry>> {
    find_logs(conn(), query).await
}

async fn find_logs(db: &DatabaseConnection, query: &LogQuery) -> anyhow::Result<Vec<LogEntry>> {
    let mut select = Entity::find().order_by_desc(Column::Id);
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        select = select.filter(Column::Category.eq(category));
    }
    let logs: Vec<LogEntry> = select
        .limit(query.limit.unwrap_or(DEFAULT_LIMIT))
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(logs)
}

/// Очистить все записи лога
pub async fn clear_all_logs() -> anyhow::Result<()> {
    Entity::delete_many().exec(conn()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;

    #[tokio::test]
    async fn test_filter_by_category_newest_first() {
        let db = memory_connection().await;
        insert_event(&db, "server", "numbering", "issued SD-20240001").await.unwrap();
        insert_event(&db, "server", "startup", "started").await.unwrap();
        insert_event(&db, "server", "numbering", "issued SD-20240002").await.unwrap();

        let numbering = find_logs(
            &db,
            &LogQuery {
                category: Some("numbering".into()),
                limit: None,
            },
        )
        .await
        .unwrap();
        let messages: Vec<&str> = numbering.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["issued SD-20240002", "issued SD-20240001"]);

        let limited = find_logs(
            &db,
            &LogQuery {
                category: None,
                limit: Some(1),
            },
        )
        .await
        .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].message, "issued SD-20240002");
    }
}
