use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Order, Query};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};

use super::error::NumberingError;
use super::series::SeriesTarget;

/// Table with one row per numbering run (`series:prefix`)
pub const COUNTER_TABLE: &str = "sys_sequence_counter";

/// Store operations the numbering core depends on.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Greatest stored code in `target` that starts with `prefix`.
    async fn max_code_with_prefix(
        &self,
        target: &SeriesTarget,
        prefix: &str,
    ) -> Result<Option<String>, NumberingError>;

    async fn counter_value(&self, key: &str) -> Result<Option<u32>, NumberingError>;

    /// Raise the counter to at least `floor`, creating it if missing.
    async fn seed_counter(&self, key: &str, floor: u32) -> Result<(), NumberingError>;

    /// Atomically add one and return the new value (1 for a new counter).
    async fn increment_counter(&self, key: &str) -> Result<u32, NumberingError>;
}

/// Smallest string that sorts after every string starting with `prefix`,
/// or `None` when no such bound exists.
pub fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    match c {
        char::MAX => None,
        '\u{D7FF}' => Some('\u{E000}'),
        _ => char::from_u32(c as u32 + 1),
    }
}

#[derive(Clone)]
pub struct SeaOrmCodeStore {
    conn: DatabaseConnection,
}

impl SeaOrmCodeStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn counter_from_row(value: i64) -> Result<u32, NumberingError> {
    u32::try_from(value).map_err(|_| {
        NumberingError::StoreUnavailable(DbErr::Custom(format!(
            "counter value {} out of range",
            value
        )))
    })
}

#[async_trait]
impl CodeStore for SeaOrmCodeStore {
    async fn max_code_with_prefix(
        &self,
        target: &SeriesTarget,
        prefix: &str,
    ) -> Result<Option<String>, NumberingError> {
        let column = Alias::new(target.column.as_str());

        // Range scan instead of LIKE: SQLite's LIKE ignores ASCII case and
        // treats `%`/`_` in the prefix as wildcards.
        let mut query = Query::select();
        query
            .column(column.clone())
            .from(Alias::new(target.table.as_str()))
            .and_where(Expr::col(column.clone()).gte(prefix))
            .order_by(column.clone(), Order::Desc)
            .limit(1);
        if let Some(upper) = prefix_upper_bound(prefix) {
            query.and_where(Expr::col(column).lt(upper));
        }

        let stmt = self.conn.get_database_backend().build(&query);
        tracing::debug!("numbering scan: {}", stmt.sql);

        let row = self.conn.query_one(stmt).await?;
        let code = match row {
            Some(row) => Some(row.try_get::<String>("", target.column.as_str())?),
            None => None,
        };
        Ok(code)
    }

    async fn counter_value(&self, key: &str) -> Result<Option<u32>, NumberingError> {
        let row = self
            .conn
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                &format!("SELECT value FROM {} WHERE series_key = ?", COUNTER_TABLE),
                [key.into()],
            ))
            .await?;
        match row {
            Some(row) => Ok(Some(counter_from_row(row.try_get::<i64>("", "value")?)?)),
            None => Ok(None),
        }
    }

    async fn seed_counter(&self, key: &str, floor: u32) -> Result<(), NumberingError> {
        self.conn
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                &format!(
                    "INSERT INTO {} (series_key, value) VALUES (?, ?) \
                     ON CONFLICT(series_key) DO UPDATE SET value = MAX(value, excluded.value)",
                    COUNTER_TABLE
                ),
                [key.into(), i64::from(floor).into()],
            ))
            .await?;
        Ok(())
    }

    async fn increment_counter(&self, key: &str) -> Result<u32, NumberingError> {
        let row = self
            .conn
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                &format!(
                    "INSERT INTO {} (series_key, value) VALUES (?, 1) \
                     ON CONFLICT(series_key) DO UPDATE SET value = value + 1 \
                     RETURNING value",
                    COUNTER_TABLE
                ),
                [key.into()],
            ))
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("counter `{}` not returned", key)))?;
        counter_from_row(row.try_get::<i64>("", "value")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use crate::shared::numbering::series::SqlIdent;

    fn target() -> SeriesTarget {
        SeriesTarget {
            table: SqlIdent::parse("a001_survey").unwrap(),
            column: SqlIdent::parse("code").unwrap(),
        }
    }

    async fn insert_code(conn: &DatabaseConnection, code: &str) {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO a001_survey (id, code, description, shipment_type, customer_name, location, survey_date) \
             VALUES (?, ?, 'cargo', 'domestic', 'c', 'l', '2024-01-01')",
            [uuid::Uuid::new_v4().to_string().into(), code.into()],
        ))
        .await
        .unwrap();
    }

    #[test]
    fn test_prefix_upper_bound() {
        assert_eq!(prefix_upper_bound("SD-2024").as_deref(), Some("SD-2025"));
        assert_eq!(prefix_upper_bound("MI-202403-").as_deref(), Some("MI-202403."));
        assert_eq!(prefix_upper_bound("a\u{10FFFF}").as_deref(), Some("b"));
        assert_eq!(prefix_upper_bound("\u{10FFFF}"), None);
        assert_eq!(prefix_upper_bound(""), None);
    }

    #[tokio::test]
    async fn test_max_code_is_scoped_to_prefix() {
        let conn = memory_connection().await;
        for code in [
            "SD-20240003",
            "SD-20240001",
            "SD-20250009",
            "SD-2023",
            "sd-20249999",
            "SDX-20249999",
            "SE-20249999",
        ] {
            insert_code(&conn, code).await;
        }
        let store = SeaOrmCodeStore::new(conn);

        let max = store.max_code_with_prefix(&target(), "SD-2024").await.unwrap();
        assert_eq!(max.as_deref(), Some("SD-20240003"));

        let none = store.max_code_with_prefix(&target(), "SI-2024").await.unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_wildcards_in_prefix_are_literal() {
        let conn = memory_connection().await;
        insert_code(&conn, "S_-20240007").await;
        insert_code(&conn, "SX-20240042").await;
        let store = SeaOrmCodeStore::new(conn);

        let max = store.max_code_with_prefix(&target(), "S_-2024").await.unwrap();
        assert_eq!(max.as_deref(), Some("S_-20240007"));
        let max = store.max_code_with_prefix(&target(), "S%").await.unwrap();
        assert_eq!(max, None);
    }

    #[tokio::test]
    async fn test_missing_table_is_store_error() {
        let conn = memory_connection().await;
        let store = SeaOrmCodeStore::new(conn);
        let target = SeriesTarget {
            table: SqlIdent::parse("no_such_table").unwrap(),
            column: SqlIdent::parse("code").unwrap(),
        };
        let err = store.max_code_with_prefix(&target, "X").await.unwrap_err();
        assert!(matches!(err, NumberingError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_counter_seed_and_increment() {
        let store = SeaOrmCodeStore::new(memory_connection().await);
        let key = "survey:SD-2024";

        assert_eq!(store.counter_value(key).await.unwrap(), None);
        assert_eq!(store.increment_counter(key).await.unwrap(), 1);
        assert_eq!(store.increment_counter(key).await.unwrap(), 2);

        // seeding never lowers a counter
        store.seed_counter(key, 1).await.unwrap();
        assert_eq!(store.counter_value(key).await.unwrap(), Some(2));

        store.seed_counter(key, 40).await.unwrap();
        assert_eq!(store.increment_counter(key).await.unwrap(), 41);

        store.seed_counter("survey:SD-2025", 0).await.unwrap();
        assert_eq!(store.counter_value("survey:SD-2025").await.unwrap(), Some(0));
    }
}
