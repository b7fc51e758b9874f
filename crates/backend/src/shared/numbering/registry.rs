use std::collections::BTreeMap;

use contracts::shared::numbering::DocumentSeries;

use super::error::NumberingError;
use super::series::{SeriesConfig, SeriesDefinition};

/// Validated series definitions keyed by series.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    series: BTreeMap<DocumentSeries, SeriesDefinition>,
}

impl SeriesRegistry {
    pub fn from_configs(configs: &[SeriesConfig]) -> Result<Self, NumberingError> {
        let mut series = BTreeMap::new();
        for cfg in configs {
            let def = SeriesDefinition::from_config(cfg)?;
            if let Some(other) = series.values().find(|other| shares_codes(other, &def)) {
                return Err(NumberingError::invalid_config(
                    cfg.series,
                    format!(
                        "prefixes overlap with series `{}` in table `{}`",
                        other.series(),
                        cfg.table
                    ),
                ));
            }
            if series.insert(cfg.series, def).is_some() {
                return Err(NumberingError::invalid_config(
                    cfg.series,
                    "series is configured more than once",
                ));
            }
        }
        Ok(Self { series })
    }

    pub fn get(&self, series: DocumentSeries) -> Result<&SeriesDefinition, NumberingError> {
        self.series
            .get(&series)
            .ok_or(NumberingError::UnknownSeries(series))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesDefinition> {
        self.series.values()
    }

    /// Every series a document type draws its code from must be configured.
    pub fn ensure_configured(&self, required: &[DocumentSeries]) -> Result<(), NumberingError> {
        for series in required {
            self.get(*series)?;
        }
        Ok(())
    }
}

/// Two series over the same column must not scan each other's codes.
fn shares_codes(a: &SeriesDefinition, b: &SeriesDefinition) -> bool {
    if a.series() == b.series() || a.target() != b.target() {
        return false;
    }
    a.static_prefixes().iter().any(|pa| {
        b.static_prefixes().iter().any(|pb| {
            pa == pb || a.scan_reaches(pa, pb) || b.scan_reaches(pb, pa)
        })
    })
}
