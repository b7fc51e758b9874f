use contracts::shared::numbering::SequenceStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::shared::numbering::SeriesConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub numbering: NumberingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NumberingConfig {
    #[serde(default)]
    pub strategy: SequenceStrategy,
    /// Offset of the business timezone; the time bucket is taken from the
    /// local date at this offset.
    #[serde(default)]
    pub utc_offset_hours: i32,
    #[serde(default = "default_max_insert_attempts")]
    pub max_insert_attempts: u32,
    pub series: Vec<SeriesConfig>,
}

fn default_max_insert_attempts() -> u32 {
    3
}

/// Default configuration embedded in the binary
pub const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/cargo_office.db"

[numbering]
strategy = "counter"
utc_offset_hours = 7
max_insert_attempts = 3

[[numbering.series]]
series = "survey"
table = "a001_survey"
column = "code"
prefix = "SV"
prefix_separator = "-"
bucket = "year"
width = 4
extraction = "fixed_tail"

[[numbering.series.variants]]
shipment_type = "import"
shipment_detail = "air"
prefix = "SIA"

[[numbering.series.variants]]
shipment_type = "import"
shipment_detail = "lcl"
prefix = "SIL"

[[numbering.series.variants]]
shipment_type = "import"
prefix = "SI"

[[numbering.series.variants]]
shipment_type = "export"
shipment_detail = "air"
prefix = "SEA"

[[numbering.series.variants]]
shipment_type = "export"
prefix = "SE"

[[numbering.series.variants]]
shipment_type = "domestic"
prefix = "SD"

[[numbering.series]]
series = "material_in"
table = "a002_material_transaction"
column = "code"
prefix = "MI"
prefix_separator = "-"
bucket = "year_month"
sequence_separator = "-"
width = 4
extraction = "last_segment"

[[numbering.series]]
series = "material_out"
table = "a002_material_transaction"
column = "code"
prefix = "MO"
prefix_separator = "-"
bucket = "year_month"
sequence_separator = "-"
width = 4
extraction = "last_segment"

[[numbering.series]]
series = "quotation"
table = "a003_quotation"
column = "code"
prefix = "QT"
bucket = "year_month"
width = 4
extraction = "fixed_tail"

[[numbering.series]]
series = "customer"
table = "a004_customer"
column = "code"
prefix = "CUS"
prefix_separator = "-"
bucket = "continuous"
width = 5
extraction = "fixed_tail"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.numbering.max_insert_attempts == 0 {
        anyhow::bail!("numbering.max_insert_attempts must be at least 1");
    }
    if !(-12..=14).contains(&config.numbering.utc_offset_hours) {
        anyhow::bail!(
            "numbering.utc_offset_hours out of range: {}",
            config.numbering.utc_offset_hours
        );
    }
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::numbering::SeriesRegistry;
    use contracts::shared::numbering::{DocumentSeries, TimeBucket};

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/cargo_office.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.numbering.strategy, SequenceStrategy::Counter);
        assert_eq!(config.numbering.series.len(), 5);
    }

    #[test]
    fn test_default_series_are_valid() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        let registry = SeriesRegistry::from_configs(&config.numbering.series).unwrap();
        for series in DocumentSeries::ALL {
            assert!(registry.get(series).is_ok(), "{} missing", series);
        }
        let customer = registry.get(DocumentSeries::Customer).unwrap();
        assert_eq!(customer.width(), 5);
        assert_eq!(customer.bucket(), TimeBucket::Continuous);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let contents = DEFAULT_CONFIG.replace("max_insert_attempts = 3", "max_insert_attempts = 0");
        assert!(parse_config(&contents).is_err());
    }

    #[test]
    fn test_server_section_is_optional() {
        let contents = DEFAULT_CONFIG.replace("[server]\nhost = \"0.0.0.0\"\nport = 3000\n", "");
        let config = parse_config(&contents).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
