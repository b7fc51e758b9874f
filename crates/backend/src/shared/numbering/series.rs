use chrono::{Datelike, NaiveDate};
use contracts::shared::numbering::{
    DocumentSeries, SequenceExtraction, SeriesFlags, SeriesInfo, ShipmentDetail, ShipmentType,
    TimeBucket,
};
use serde::Deserialize;

use super::error::NumberingError;

/// Prefix used instead of the series default when the document's shipment
/// flags match. `shipment_detail = None` matches any detail.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefixVariant {
    pub shipment_type: ShipmentType,
    #[serde(default)]
    pub shipment_detail: Option<ShipmentDetail>,
    pub prefix: String,
}

/// `[[numbering.series]]` entry of config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesConfig {
    pub series: DocumentSeries,
    pub table: String,
    pub column: String,
    pub prefix: String,
    /// Between the static prefix and the period
    #[serde(default)]
    pub prefix_separator: String,
    pub bucket: TimeBucket,
    /// Between the period and the sequence digits
    #[serde(default)]
    pub sequence_separator: String,
    pub width: u8,
    pub extraction: SequenceExtraction,
    #[serde(default)]
    pub variants: Vec<PrefixVariant>,
}

/// Validated SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlIdent(String);

impl SqlIdent {
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let first_ok = chars
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
        if first_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Table and text column holding the issued codes of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesTarget {
    pub table: SqlIdent,
    pub column: SqlIdent,
}

/// Identity of one numbering run: the series plus the full text that
/// precedes the sequence digits (static prefix, separators and period).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub series: DocumentSeries,
    pub prefix: String,
}

impl SeriesKey {
    /// Primary key of the row in `sys_sequence_counter`
    pub fn counter_key(&self) -> String {
        format!("{}:{}", self.series, self.prefix)
    }
}

#[derive(Debug, Clone)]
pub struct SeriesDefinition {
    series: DocumentSeries,
    target: SeriesTarget,
    prefix: String,
    prefix_separator: String,
    bucket: TimeBucket,
    sequence_separator: String,
    width: u8,
    extraction: SequenceExtraction,
    variants: Vec<PrefixVariant>,
}

impl SeriesDefinition {
    pub fn from_config(cfg: &SeriesConfig) -> Result<Self, NumberingError> {
        let series = cfg.series;
        let table = SqlIdent::parse(&cfg.table).ok_or_else(|| {
            NumberingError::invalid_config(series, format!("invalid table name `{}`", cfg.table))
        })?;
        let column = SqlIdent::parse(&cfg.column).ok_or_else(|| {
            NumberingError::invalid_config(series, format!("invalid column name `{}`", cfg.column))
        })?;

        if cfg.prefix.trim().is_empty() {
            return Err(NumberingError::invalid_config(series, "prefix must not be empty"));
        }
        if let Some(v) = cfg.variants.iter().find(|v| v.prefix.trim().is_empty()) {
            return Err(NumberingError::invalid_config(
                series,
                format!("empty prefix for variant `{}`", v.shipment_type.as_str()),
            ));
        }

        for sep in [&cfg.prefix_separator, &cfg.sequence_separator] {
            if sep.chars().any(|c| c.is_ascii_digit()) {
                return Err(NumberingError::invalid_config(
                    series,
                    format!("separator `{}` must not contain digits", sep),
                ));
            }
        }

        if !(1..=9).contains(&cfg.width) {
            return Err(NumberingError::invalid_config(
                series,
                format!("width must be between 1 and 9, got {}", cfg.width),
            ));
        }

        if cfg.extraction == SequenceExtraction::LastSegment && cfg.sequence_separator.is_empty() {
            return Err(NumberingError::invalid_config(
                series,
                "last_segment extraction needs a sequence_separator",
            ));
        }

        let def = Self {
            series,
            target: SeriesTarget { table, column },
            prefix: cfg.prefix.clone(),
            prefix_separator: cfg.prefix_separator.clone(),
            bucket: cfg.bucket,
            sequence_separator: cfg.sequence_separator.clone(),
            width: cfg.width,
            extraction: cfg.extraction,
            variants: cfg.variants.clone(),
        };

        let prefixes = def.static_prefixes();
        for shorter in &prefixes {
            if let Some(longer) = prefixes
                .iter()
                .find(|longer| longer != &shorter && def.scan_reaches(shorter, longer))
            {
                return Err(NumberingError::invalid_config(
                    series,
                    format!("codes of prefix `{}` fall into the range of `{}`", longer, shorter),
                ));
            }
        }

        Ok(def)
    }

    pub fn series(&self) -> DocumentSeries {
        self.series
    }

    pub fn target(&self) -> &SeriesTarget {
        &self.target
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn bucket(&self) -> TimeBucket {
        self.bucket
    }

    /// First matching variant wins, otherwise the series default.
    pub fn select_prefix(&self, flags: &SeriesFlags) -> &str {
        let Some(shipment_type) = flags.shipment_type else {
            return &self.prefix;
        };
        self.variants
            .iter()
            .find(|v| {
                v.shipment_type == shipment_type
                    && v.shipment_detail.map_or(true, |d| Some(d) == flags.shipment_detail)
            })
            .map_or(self.prefix.as_str(), |v| v.prefix.as_str())
    }

    pub fn bucket_text(&self, date: NaiveDate) -> String {
        match self.bucket {
            TimeBucket::Continuous => String::new(),
            TimeBucket::Year => format!("{:04}", date.year()),
            TimeBucket::YearMonth => format!("{:04}{:02}", date.year(), date.month()),
        }
    }

    pub fn key_for(&self, flags: &SeriesFlags, date: NaiveDate) -> SeriesKey {
        self.key_with_prefix(self.select_prefix(flags), date)
    }

    fn key_with_prefix(&self, prefix: &str, date: NaiveDate) -> SeriesKey {
        SeriesKey {
            series: self.series,
            prefix: format!(
                "{}{}{}{}",
                prefix,
                self.prefix_separator,
                self.bucket_text(date),
                self.sequence_separator
            ),
        }
    }

    /// Default prefix followed by every distinct variant prefix.
    pub(crate) fn static_prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = vec![self.prefix.as_str()];
        for v in &self.variants {
            if !prefixes.contains(&v.prefix.as_str()) {
                prefixes.push(&v.prefix);
            }
        }
        prefixes
    }

    /// True when a code issued under static prefix `other` can land in the
    /// scan range of `own` laid out by this definition.
    ///
    /// The range of `own` is everything starting with
    /// `own + prefix_separator + period + sequence_separator`, so `other`
    /// collides when it extends `own` with text that fits that layout.
    pub(crate) fn scan_reaches(&self, own: &str, other: &str) -> bool {
        let Some(rest) = other.strip_prefix(own) else {
            return false;
        };
        let period_digits = match self.bucket {
            TimeBucket::Continuous => 0,
            TimeBucket::Year => 4,
            TimeBucket::YearMonth => 6,
        };
        // None: любая цифра периода
        let layout = self
            .prefix_separator
            .chars()
            .map(Some)
            .chain(std::iter::repeat(None).take(period_digits))
            .chain(self.sequence_separator.chars().map(Some));
        rest.chars().zip(layout).all(|(c, slot)| match slot {
            Some(literal) => c == literal,
            None => c.is_ascii_digit(),
        })
    }

    /// Keys of the default prefix and every distinct variant prefix.
    pub fn all_keys(&self, date: NaiveDate) -> Vec<SeriesKey> {
        self.static_prefixes()
            .into_iter()
            .map(|p| self.key_with_prefix(p, date))
            .collect()
    }

    pub fn format_code(&self, key: &SeriesKey, sequence: u32) -> String {
        format!(
            "{}{:0width$}",
            key.prefix,
            sequence,
            width = self.width as usize
        )
    }

    /// Sequence number carried by a stored code. Anything that is not a plain
    /// run of digits (legacy or hand-edited rows) reads as 0.
    pub fn extract_sequence(&self, code: &str) -> u32 {
        let tail = match self.extraction {
            SequenceExtraction::FixedTail => code
                .char_indices()
                .rev()
                .nth(self.width as usize - 1)
                .map_or(code, |(idx, _)| &code[idx..]),
            SequenceExtraction::LastSegment => code
                .rsplit(self.sequence_separator.as_str())
                .next()
                .unwrap_or(""),
        };
        parse_digits(tail)
    }

    pub fn max_sequence(&self) -> u32 {
        10u32.pow(self.width as u32) - 1
    }

    pub fn info(&self, date: NaiveDate) -> SeriesInfo {
        let key = self.key_for(&SeriesFlags::none(), date);
        let mut variant_prefixes: Vec<String> = Vec::new();
        for v in &self.variants {
            if !variant_prefixes.contains(&v.prefix) {
                variant_prefixes.push(v.prefix.clone());
            }
        }
        SeriesInfo {
            series: self.series,
            table: self.target.table.as_str().to_string(),
            column: self.target.column.as_str().to_string(),
            prefix: self.prefix.clone(),
            variant_prefixes,
            bucket: self.bucket,
            width: self.width,
            extraction: self.extraction,
            sample_code: self.format_code(&key, 1),
        }
    }
}

fn parse_digits(s: &str) -> u32 {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    s.parse::<u32>().unwrap_or(0)
}
