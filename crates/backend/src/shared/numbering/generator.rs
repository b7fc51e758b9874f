use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use contracts::shared::numbering::{
    BackfillEntry, CodePreview, DocumentSeries, SequenceStrategy, SeriesFlags,
};

use super::error::NumberingError;
use super::registry::SeriesRegistry;
use super::series::{SeriesDefinition, SeriesKey};
use super::store::CodeStore;
use crate::shared::config::NumberingConfig;

/// A code computed for a new record, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    pub key: SeriesKey,
    pub sequence: u32,
    pub code: String,
}

impl From<IssuedCode> for CodePreview {
    fn from(c: IssuedCode) -> Self {
        CodePreview {
            series: c.key.series,
            prefix: c.key.prefix,
            sequence: c.sequence,
            code: c.code,
        }
    }
}

/// Issues document codes.
///
/// With [`SequenceStrategy::ScanMax`] the next code is derived from the
/// greatest stored code under the prefix. Two requests racing on the same
/// series compute the same code, and only the target table's unique index
/// tells them apart.
///
/// With [`SequenceStrategy::Counter`] every prefix owns a row in
/// `sys_sequence_counter`, incremented by a single upsert statement. The row
/// is seeded from the stored codes the first time a prefix is seen, so
/// switching strategies on an existing database continues the numbering.
pub struct SequenceGenerator {
    store: Arc<dyn CodeStore>,
    registry: SeriesRegistry,
    strategy: SequenceStrategy,
    offset: FixedOffset,
}

impl SequenceGenerator {
    pub fn new(
        store: Arc<dyn CodeStore>,
        registry: SeriesRegistry,
        strategy: SequenceStrategy,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            registry,
            strategy,
            offset,
        }
    }

    pub fn from_config(
        store: Arc<dyn CodeStore>,
        config: &NumberingConfig,
    ) -> Result<Self, NumberingError> {
        let registry = SeriesRegistry::from_configs(&config.series)?;
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            NumberingError::invalid_config(
                "numbering",
                format!("invalid utc_offset_hours {}", config.utc_offset_hours),
            )
        })?;
        Ok(Self::new(store, registry, config.strategy, offset))
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn strategy(&self) -> SequenceStrategy {
        self.strategy
    }

    /// Business date used for the time bucket
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    pub async fn next_code(
        &self,
        series: DocumentSeries,
        flags: &SeriesFlags,
    ) -> Result<IssuedCode, NumberingError> {
        self.next_code_on(series, flags, self.today()).await
    }

    pub async fn next_code_on(
        &self,
        series: DocumentSeries,
        flags: &SeriesFlags,
        date: NaiveDate,
    ) -> Result<IssuedCode, NumberingError> {
        let def = self.registry.get(series)?;
        let key = def.key_for(flags, date);

        let sequence = match self.strategy {
            SequenceStrategy::ScanMax => self.scan_sequence(def, &key).await?.saturating_add(1),
            SequenceStrategy::Counter => {
                let counter_key = key.counter_key();
                if self.store.counter_value(&counter_key).await?.is_none() {
                    let floor = self.scan_sequence(def, &key).await?;
                    self.store.seed_counter(&counter_key, floor).await?;
                }
                self.store.increment_counter(&counter_key).await?
            }
        };

        let issued = Self::build(def, key, sequence)?;
        tracing::debug!(
            "issued {} (series {}, {:?})",
            issued.code,
            series,
            self.strategy
        );
        Ok(issued)
    }

    /// The code the next call would return, without consuming a number.
    pub async fn peek_on(
        &self,
        series: DocumentSeries,
        flags: &SeriesFlags,
        date: NaiveDate,
    ) -> Result<IssuedCode, NumberingError> {
        let def = self.registry.get(series)?;
        let key = def.key_for(flags, date);

        let current = match self.strategy {
            SequenceStrategy::ScanMax => self.scan_sequence(def, &key).await?,
            SequenceStrategy::Counter => match self.store.counter_value(&key.counter_key()).await? {
                Some(value) => value,
                None => self.scan_sequence(def, &key).await?,
            },
        };

        Self::build(def, key, current.saturating_add(1))
    }

    /// Pull the counter up to the greatest stored code. Used after an insert
    /// hit a code that was stored behind the counter's back.
    pub async fn resync(&self, key: &SeriesKey) -> Result<(), NumberingError> {
        if self.strategy == SequenceStrategy::ScanMax {
            return Ok(());
        }
        let def = self.registry.get(key.series)?;
        let floor = self.scan_sequence(def, key).await?;
        self.store.seed_counter(&key.counter_key(), floor).await
    }

    /// Seed the counters of every series and prefix variant for the period
    /// containing `date` from the codes already stored.
    pub async fn backfill(&self, date: NaiveDate) -> Result<Vec<BackfillEntry>, NumberingError> {
        let mut entries = Vec::new();
        for def in self.registry.iter() {
            for key in def.all_keys(date) {
                let counter_key = key.counter_key();
                let floor = self.scan_sequence(def, &key).await?;
                self.store.seed_counter(&counter_key, floor).await?;
                let seeded = self.store.counter_value(&counter_key).await?.unwrap_or(floor);
                tracing::info!("backfill {} -> {}", counter_key, seeded);
                entries.push(BackfillEntry {
                    series: key.series,
                    prefix: key.prefix,
                    seeded,
                });
            }
        }
        Ok(entries)
    }

    async fn scan_sequence(
        &self,
        def: &SeriesDefinition,
        key: &SeriesKey,
    ) -> Result<u32, NumberingError> {
        let max = self
            .store
            .max_code_with_prefix(def.target(), &key.prefix)
            .await?;
        Ok(max.map_or(0, |code| def.extract_sequence(&code)))
    }

    fn build(
        def: &SeriesDefinition,
        key: SeriesKey,
        sequence: u32,
    ) -> Result<IssuedCode, NumberingError> {
        if sequence > def.max_sequence() {
            return Err(NumberingError::Exhausted {
                prefix: key.prefix,
                width: def.width(),
            });
        }
        let code = def.format_code(&key, sequence);
        Ok(IssuedCode {
            key,
            sequence,
            code,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use crate::shared::numbering::series::tests::{
        customer_config, material_in_config, survey_config,
    };
    use crate::shared::numbering::series::SeriesConfig;
    use crate::shared::numbering::store::SeaOrmCodeStore;
    use contracts::shared::numbering::ShipmentType;
    use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

    const STRATEGIES: [SequenceStrategy; 2] = [SequenceStrategy::ScanMax, SequenceStrategy::Counter];

    pub(crate) fn generator(conn: &DatabaseConnection, strategy: SequenceStrategy) -> SequenceGenerator {
        generator_with(
            conn,
            strategy,
            &[survey_config(), material_in_config(), customer_config()],
        )
    }

    pub(crate) fn generator_with(
        conn: &DatabaseConnection,
        strategy: SequenceStrategy,
        configs: &[SeriesConfig],
    ) -> SequenceGenerator {
        let registry = SeriesRegistry::from_configs(configs).unwrap();
        SequenceGenerator::new(
            Arc::new(SeaOrmCodeStore::new(conn.clone())),
            registry,
            strategy,
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    pub(crate) async fn store_survey_code(conn: &DatabaseConnection, code: &str) {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO a001_survey (id, code, description, shipment_type, customer_name, location, survey_date) \
             VALUES (?, ?, 'cargo', 'domestic', 'c', 'l', '2024-01-01')",
            [uuid::Uuid::new_v4().to_string().into(), code.into()],
        ))
        .await
        .unwrap();
    }

    async fn store_customer_code(conn: &DatabaseConnection, code: &str) {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO a004_customer (id, code, description) VALUES (?, ?, 'customer')",
            [uuid::Uuid::new_v4().to_string().into(), code.into()],
        ))
        .await
        .unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn domestic() -> SeriesFlags {
        SeriesFlags::shipment(ShipmentType::Domestic, None)
    }

    #[tokio::test]
    async fn test_sequential_calls_count_from_one() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            let gen = generator(&conn, strategy);
            let mut sequences = Vec::new();
            for _ in 0..12 {
                let issued = gen
                    .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 5, 1))
                    .await
                    .unwrap();
                store_survey_code(&conn, &issued.code).await;
                sequences.push(issued.sequence);
            }
            assert_eq!(sequences, (1..=12).collect::<Vec<u32>>(), "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_empty_table_starts_at_one() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            let gen = generator(&conn, strategy);

            let survey = gen
                .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 5, 1))
                .await
                .unwrap();
            assert_eq!(survey.code, "SD-20240001");

            let customer = gen
                .next_code_on(DocumentSeries::Customer, &SeriesFlags::none(), date(2024, 5, 1))
                .await
                .unwrap();
            assert_eq!(customer.code, "CUS-00001");

            let material = gen
                .next_code_on(DocumentSeries::MaterialIn, &SeriesFlags::none(), date(2024, 5, 1))
                .await
                .unwrap();
            assert_eq!(material.code, "MI-202405-0001");
        }
    }

    #[tokio::test]
    async fn test_continues_after_existing_max() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            store_survey_code(&conn, "SD-20240001").await;
            store_survey_code(&conn, "SD-20240003").await;
            let gen = generator(&conn, strategy);

            let issued = gen
                .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 8, 20))
                .await
                .unwrap();
            assert_eq!(issued.code, "SD-20240004", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_foreign_prefixes_are_ignored() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            for code in ["SI-20249999", "SD-20239999", "sd-20249999", "SDX-20240500"] {
                store_survey_code(&conn, code).await;
            }
            let gen = generator(&conn, strategy);

            let issued = gen
                .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 2))
                .await
                .unwrap();
            assert_eq!(issued.code, "SD-20240001", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_malformed_max_restarts_numbering() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            store_survey_code(&conn, "SD-20240002").await;
            store_survey_code(&conn, "SD-2024LEGACY").await;
            let gen = generator(&conn, strategy);

            let issued = gen
                .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 2))
                .await
                .unwrap();
            assert_eq!(issued.code, "SD-20240001", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_new_bucket_resets_sequence() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            let gen = generator(&conn, strategy);

            for _ in 0..3 {
                let issued = gen
                    .next_code_on(DocumentSeries::MaterialIn, &SeriesFlags::none(), date(2024, 10, 31))
                    .await
                    .unwrap();
                conn.execute(Statement::from_sql_and_values(
                    DatabaseBackend::Sqlite,
                    "INSERT INTO a002_material_transaction (id, code, direction, material_name, quantity, unit, warehouse, transaction_date) \
                     VALUES (?, ?, 'in', 'film', 1.0, 'roll', 'WH-1', '2024-10-31')",
                    [uuid::Uuid::new_v4().to_string().into(), issued.code.into()],
                ))
                .await
                .unwrap();
            }

            let november = gen
                .next_code_on(DocumentSeries::MaterialIn, &SeriesFlags::none(), date(2024, 11, 1))
                .await
                .unwrap();
            assert_eq!(november.code, "MI-202411-0001", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_width_overflow_is_an_error() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            store_customer_code(&conn, "CUS-99999").await;
            let gen = generator(&conn, strategy);

            let err = gen
                .next_code_on(DocumentSeries::Customer, &SeriesFlags::none(), date(2024, 1, 1))
                .await
                .unwrap_err();
            assert!(matches!(err, NumberingError::Exhausted { width: 5, .. }), "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_unknown_series() {
        let conn = memory_connection().await;
        let gen = generator(&conn, SequenceStrategy::Counter);
        let err = gen
            .next_code_on(DocumentSeries::Quotation, &SeriesFlags::none(), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, NumberingError::UnknownSeries(DocumentSeries::Quotation)));
    }

    #[tokio::test]
    async fn test_counter_never_repeats_without_persistence() {
        let conn = memory_connection().await;
        let gen = generator(&conn, SequenceStrategy::Counter);
        let first = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 1))
            .await
            .unwrap();
        let second = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[tokio::test]
    async fn test_scan_max_repeats_without_persistence() {
        // read-max-then-increment: nothing stored means the same code again
        let conn = memory_connection().await;
        let gen = generator(&conn, SequenceStrategy::ScanMax);
        let first = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 1))
            .await
            .unwrap();
        let second = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(first.code, second.code);
    }

    #[tokio::test]
    async fn test_concurrent_counter_issuance_is_distinct() {
        let conn = memory_connection().await;
        store_survey_code(&conn, "SD-20240010").await;
        let gen = Arc::new(generator(&conn, SequenceStrategy::Counter));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = gen.clone();
                tokio::spawn(async move {
                    gen.next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 6, 1))
                        .await
                        .unwrap()
                        .sequence
                })
            })
            .collect();

        let mut sequences = Vec::new();
        for handle in handles {
            sequences.push(handle.await.unwrap());
        }
        sequences.sort_unstable();
        assert_eq!(sequences, (11..=18).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_peek_does_not_consume() {
        for strategy in STRATEGIES {
            let conn = memory_connection().await;
            store_survey_code(&conn, "SD-20240005").await;
            let gen = generator(&conn, strategy);

            let peeked = gen
                .peek_on(DocumentSeries::Survey, &domestic(), date(2024, 2, 2))
                .await
                .unwrap();
            let again = gen
                .peek_on(DocumentSeries::Survey, &domestic(), date(2024, 2, 2))
                .await
                .unwrap();
            let issued = gen
                .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 2, 2))
                .await
                .unwrap();
            assert_eq!(peeked.code, "SD-20240006");
            assert_eq!(again, peeked);
            assert_eq!(issued, peeked);
        }
    }

    #[tokio::test]
    async fn test_resync_catches_up_with_table() {
        let conn = memory_connection().await;
        let gen = generator(&conn, SequenceStrategy::Counter);
        let first = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 3, 3))
            .await
            .unwrap();
        assert_eq!(first.sequence, 1);

        // rows written around the counter
        store_survey_code(&conn, "SD-20240001").await;
        store_survey_code(&conn, "SD-20240007").await;

        gen.resync(&first.key).await.unwrap();
        let next = gen
            .next_code_on(DocumentSeries::Survey, &domestic(), date(2024, 3, 3))
            .await
            .unwrap();
        assert_eq!(next.code, "SD-20240008");
    }

    #[tokio::test]
    async fn test_backfill_seeds_every_prefix() {
        let conn = memory_connection().await;
        store_survey_code(&conn, "SD-20240042").await;
        store_survey_code(&conn, "SI-20240007").await;
        store_customer_code(&conn, "CUS-00120").await;
        let gen = generator(&conn, SequenceStrategy::Counter);

        let entries = gen.backfill(date(2024, 9, 9)).await.unwrap();
        let seeded = |prefix: &str| {
            entries
                .iter()
                .find(|e| e.prefix == prefix)
                .map(|e| e.seeded)
        };
        assert_eq!(seeded("SD-2024"), Some(42));
        assert_eq!(seeded("SI-2024"), Some(7));
        assert_eq!(seeded("SIA-2024"), Some(0));
        assert_eq!(seeded("SV-2024"), Some(0));
        assert_eq!(seeded("MI-202409-"), Some(0));
        assert_eq!(seeded("CUS-"), Some(120));

        let customer = gen
            .next_code_on(DocumentSeries::Customer, &SeriesFlags::none(), date(2024, 9, 9))
            .await
            .unwrap();
        assert_eq!(customer.code, "CUS-00121");
    }
}
