use axum::Json;
use contracts::shared::numbering::{
    BackfillEntry, BackfillRequest, CodePreview, PreviewRequest, SeriesInfo,
};

use super::{api_error, ApiError};
use crate::shared::logger;
use crate::shared::numbering::get_generator;

/// GET /api/sequences
pub async fn list_series() -> Json<Vec<SeriesInfo>> {
    let generator = get_generator();
    let today = generator.today();
    Json(generator.registry().iter().map(|def| def.info(today)).collect())
}

/// POST /api/sequences/preview
///
/// Номер, который получит следующий документ; счётчик не расходуется.
pub async fn preview(Json(req): Json<PreviewRequest>) -> Result<Json<CodePreview>, ApiError> {
    let generator = get_generator();
    let date = req.date.unwrap_or_else(|| generator.today());
    generator
        .peek_on(req.series, &req.flags, date)
        .await
        .map(|issued| Json(issued.into()))
        .map_err(|e| api_error(e.into()))
}

/// POST /api/sequences/backfill
pub async fn backfill(
    body: Option<Json<BackfillRequest>>,
) -> Result<Json<Vec<BackfillEntry>>, ApiError> {
    let generator = get_generator();
    let date = body
        .and_then(|Json(req)| req.date)
        .unwrap_or_else(|| generator.today());

    let entries = generator
        .backfill(date)
        .await
        .map_err(|e| api_error(e.into()))?;

    logger::log(
        "numbering",
        &format!("Backfill счётчиков за {}: {} префиксов", date, entries.len()),
    );
    Ok(Json(entries))
}
