pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use contracts::domain::a001_survey::aggregate::Survey;
use contracts::domain::a002_material_transaction::aggregate::MaterialTransaction;
use contracts::domain::a003_quotation::aggregate::Quotation;
use contracts::domain::a004_customer::aggregate::Customer;
use contracts::domain::common::AggregateRoot;
use shared::numbering::{SeaOrmCodeStore, SequenceGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;

    // Initialize database
    let db_path = shared::config::get_database_path(&config)?;
    let db_path = db_path.to_string_lossy().to_string();
    shared::data::db::initialize_database(Some(&db_path))
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    // Numbering: series registry + store over the shared connection
    let store = SeaOrmCodeStore::new(shared::data::db::get_connection().clone());
    let generator = SequenceGenerator::from_config(Arc::new(store), &config.numbering)?;
    for (aggregate, required) in [
        (Survey::full_name(), Survey::numbering_series()),
        (MaterialTransaction::full_name(), MaterialTransaction::numbering_series()),
        (Quotation::full_name(), Quotation::numbering_series()),
        (Customer::full_name(), Customer::numbering_series()),
    ] {
        generator
            .registry()
            .ensure_configured(required)
            .map_err(|e| anyhow::anyhow!("{}: {}", aggregate, e))?;
    }
    tracing::info!(
        "Business date {} (UTC{:+})",
        generator.today(),
        config.numbering.utc_offset_hours
    );
    shared::numbering::initialize(generator, config.numbering.max_insert_attempts)?;
    shared::logger::log("startup", "Сервер запущен");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes()
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
