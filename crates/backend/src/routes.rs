use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DOCUMENTS
        // ========================================
        // A001 Survey handlers
        .route(
            "/api/survey",
            get(handlers::a001_survey::list_all).post(handlers::a001_survey::upsert),
        )
        .route(
            "/api/survey/:id",
            get(handlers::a001_survey::get_by_id).delete(handlers::a001_survey::delete),
        )
        // A002 Material transaction handlers
        .route(
            "/api/material_transaction",
            get(handlers::a002_material_transaction::list_all)
                .post(handlers::a002_material_transaction::upsert),
        )
        .route(
            "/api/material_transaction/:id",
            get(handlers::a002_material_transaction::get_by_id)
                .delete(handlers::a002_material_transaction::delete),
        )
        // A003 Quotation handlers
        .route(
            "/api/quotation",
            get(handlers::a003_quotation::list_all).post(handlers::a003_quotation::upsert),
        )
        .route(
            "/api/quotation/:id",
            get(handlers::a003_quotation::get_by_id).delete(handlers::a003_quotation::delete),
        )
        // A004 Customer handlers
        .route(
            "/api/customer",
            get(handlers::a004_customer::list_all).post(handlers::a004_customer::upsert),
        )
        .route(
            "/api/customer/:id",
            get(handlers::a004_customer::get_by_id).delete(handlers::a004_customer::delete),
        )
        // ========================================
        // NUMBERING
        // ========================================
        .route("/api/sequences", get(handlers::sequences::list_series))
        .route("/api/sequences/preview", post(handlers::sequences::preview))
        .route("/api/sequences/backfill", post(handlers::sequences::backfill))
        // ========================================
        // SYSTEM LOG
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
}
