use serde::{Deserialize, Serialize};

/// Запись журнала событий (выдача номеров, повторы, backfill)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    pub source: String, // "client" или "server"
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub source: String,
    pub category: String,
    pub message: String,
}

/// Фильтр для `GET /api/logs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogQuery {
    pub category: Option<String>,
    pub limit: Option<u64>,
}
