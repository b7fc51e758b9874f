use contracts::shared::numbering::DocumentSeries;
use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum NumberingError {
    /// Query or counter update against the store failed.
    #[error("numbering store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),

    #[error("numbering series `{0}` is not configured")]
    UnknownSeries(DocumentSeries),

    #[error("invalid configuration for series `{series}`: {reason}")]
    InvalidConfig { series: String, reason: String },

    /// The next sequence no longer fits the series width.
    #[error("sequence exhausted for prefix `{prefix}` (width {width})")]
    Exhausted { prefix: String, width: u8 },

    /// Another request stored the same code first and the retry budget ran out.
    #[error("document code `{0}` is already taken, please retry")]
    DuplicateCode(String),
}

impl NumberingError {
    pub(crate) fn invalid_config(series: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        NumberingError::InvalidConfig {
            series: series.to_string(),
            reason: reason.into(),
        }
    }
}
