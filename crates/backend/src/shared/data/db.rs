use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/cargo_office.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    tracing::info!("Opening database {}", db_url);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "system_log",
        r#"
        CREATE TABLE system_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            category TEXT NOT NULL,
            message TEXT NOT NULL
        );
        "#,
    ),
    (
        "sys_sequence_counter",
        r#"
        CREATE TABLE sys_sequence_counter (
            series_key TEXT PRIMARY KEY NOT NULL,
            value INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a001_survey",
        r#"
        CREATE TABLE a001_survey (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            comment TEXT,
            shipment_type TEXT NOT NULL,
            shipment_detail TEXT,
            customer_name TEXT NOT NULL,
            location TEXT NOT NULL,
            survey_date TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_material_transaction",
        r#"
        CREATE TABLE a002_material_transaction (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            comment TEXT,
            direction TEXT NOT NULL,
            material_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit TEXT NOT NULL,
            warehouse TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_quotation",
        r#"
        CREATE TABLE a003_quotation (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            comment TEXT,
            customer_name TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            valid_until TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_customer",
        r#"
        CREATE TABLE a004_customer (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL,
            comment TEXT,
            tax_id TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            email TEXT,
            address TEXT NOT NULL DEFAULT '',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

/// Document tables whose `code` column is unique
const CODED_TABLES: &[&str] = &[
    "a001_survey",
    "a002_material_transaction",
    "a003_quotation",
    "a004_customer",
];

/// Ensure required tables exist (minimal schema bootstrap)
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, create_sql) in SCHEMA {
        let exists = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
                [(*table).into()],
            ))
            .await?;

        if exists.is_empty() {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                create_sql.to_string(),
            ))
            .await?;
        }
    }

    // Уникальность номера гарантирует база, а не генератор
    for table in CODED_TABLES {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_code ON {table} (code);",
                table = table
            ),
        ))
        .await?;
    }

    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Like [`get_connection`], but `None` before startup finished
pub fn try_get_connection() -> Option<&'static DatabaseConnection> {
    DB_CONN.get()
}

/// Fresh in-memory database with the full schema
#[cfg(test)]
pub async fn memory_connection() -> DatabaseConnection {
    let mut opts = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    // one connection: every pooled connection would get its own empty database
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts)
        .await
        .expect("in-memory sqlite must open");
    bootstrap_schema(&conn)
        .await
        .expect("schema bootstrap must succeed");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = memory_connection().await;
        bootstrap_schema(&conn).await.unwrap();

        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%_code'"
                    .to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), CODED_TABLES.len());
    }
}
