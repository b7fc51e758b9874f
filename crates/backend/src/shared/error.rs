/// Errors of the document services that map to a client error.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid ID")]
    InvalidId,

    #[error("Not found")]
    NotFound,
}
