use std::future::Future;

use chrono::NaiveDate;
use contracts::shared::numbering::{DocumentSeries, SeriesFlags};
use sea_orm::{DbErr, SqlErr};

use super::error::NumberingError;
use super::generator::{IssuedCode, SequenceGenerator};
use crate::shared::logger;

/// True when the error chain carries a unique constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<DbErr>().and_then(|e| e.sql_err()),
            Some(SqlErr::UniqueConstraintViolation(_))
        )
    })
}

/// Issue a code for `series` and hand it to `insert`.
///
/// When the insert hits the unique index on the code column the counter is
/// resynced from the table and a fresh code is tried, at most
/// `max_attempts` times in total.
pub async fn issue_with_retry<F, Fut, T>(
    generator: &SequenceGenerator,
    series: DocumentSeries,
    flags: &SeriesFlags,
    max_attempts: u32,
    insert: F,
) -> anyhow::Result<(IssuedCode, T)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    issue_with_retry_on(generator, series, flags, generator.today(), max_attempts, insert).await
}

pub async fn issue_with_retry_on<F, Fut, T>(
    generator: &SequenceGenerator,
    series: DocumentSeries,
    flags: &SeriesFlags,
    date: NaiveDate,
    max_attempts: u32,
    mut insert: F,
) -> anyhow::Result<(IssuedCode, T)>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let issued = generator.next_code_on(series, flags, date).await?;
        match insert(issued.code.clone()).await {
            Ok(value) => return Ok((issued, value)),
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(
                    "code {} already taken (attempt {}/{})",
                    issued.code,
                    attempt,
                    max_attempts
                );
                logger::log(
                    "numbering",
                    &format!(
                        "duplicate code {} on attempt {}/{}",
                        issued.code, attempt, max_attempts
                    ),
                );
                if attempt >= max_attempts {
                    return Err(NumberingError::DuplicateCode(issued.code).into());
                }
                generator.resync(&issued.key).await?;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
