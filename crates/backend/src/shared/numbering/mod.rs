//! Document code issuance: series configuration, the code store adapter and
//! the sequence generator.

pub mod error;
pub mod generator;
pub mod issue;
pub mod registry;
pub mod series;
pub mod store;

use once_cell::sync::OnceCell;

pub use error::NumberingError;
pub use generator::{IssuedCode, SequenceGenerator};
pub use issue::{is_unique_violation, issue_with_retry};
pub use registry::SeriesRegistry;
pub use series::{PrefixVariant, SeriesConfig, SeriesDefinition, SeriesKey};
pub use store::{CodeStore, SeaOrmCodeStore};

static GENERATOR: OnceCell<SequenceGenerator> = OnceCell::new();
static MAX_INSERT_ATTEMPTS: OnceCell<u32> = OnceCell::new();

pub fn initialize(generator: SequenceGenerator, max_insert_attempts: u32) -> anyhow::Result<()> {
    tracing::info!(
        "Numbering initialized: {} series, strategy {:?}",
        generator.registry().iter().count(),
        generator.strategy()
    );
    GENERATOR
        .set(generator)
        .map_err(|_| anyhow::anyhow!("Failed to set GENERATOR"))?;
    MAX_INSERT_ATTEMPTS
        .set(max_insert_attempts)
        .map_err(|_| anyhow::anyhow!("Failed to set MAX_INSERT_ATTEMPTS"))?;
    Ok(())
}

pub fn get_generator() -> &'static SequenceGenerator {
    GENERATOR
        .get()
        .expect("Sequence generator has not been initialized")
}

pub fn max_insert_attempts() -> u32 {
    MAX_INSERT_ATTEMPTS.get().copied().unwrap_or(3)
}
