//! Vocabulary of the document numbering series shared by the backend and
//! API clients.

use serde::{Deserialize, Serialize};

/// Серия нумерации документов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSeries {
    /// Акт осмотра груза
    Survey,
    /// Приход материалов
    MaterialIn,
    /// Расход материалов
    MaterialOut,
    /// Коммерческое предложение
    Quotation,
    /// Код клиента в справочнике
    Customer,
}

impl DocumentSeries {
    pub const ALL: [DocumentSeries; 5] = [
        DocumentSeries::Survey,
        DocumentSeries::MaterialIn,
        DocumentSeries::MaterialOut,
        DocumentSeries::Quotation,
        DocumentSeries::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSeries::Survey => "survey",
            DocumentSeries::MaterialIn => "material_in",
            DocumentSeries::MaterialOut => "material_out",
            DocumentSeries::Quotation => "quotation",
            DocumentSeries::Customer => "customer",
        }
    }
}

impl std::fmt::Display for DocumentSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Тип перевозки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentType {
    Domestic,
    Import,
    Export,
}

impl ShipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentType::Domestic => "domestic",
            ShipmentType::Import => "import",
            ShipmentType::Export => "export",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "domestic" => Some(ShipmentType::Domestic),
            "import" => Some(ShipmentType::Import),
            "export" => Some(ShipmentType::Export),
            _ => None,
        }
    }
}

/// Детализация перевозки (вид доставки / загрузки)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentDetail {
    /// Full container load
    Fcl,
    /// Less than container load
    Lcl,
    Air,
    Land,
}

impl ShipmentDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentDetail::Fcl => "fcl",
            ShipmentDetail::Lcl => "lcl",
            ShipmentDetail::Air => "air",
            ShipmentDetail::Land => "land",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fcl" => Some(ShipmentDetail::Fcl),
            "lcl" => Some(ShipmentDetail::Lcl),
            "air" => Some(ShipmentDetail::Air),
            "land" => Some(ShipmentDetail::Land),
            _ => None,
        }
    }
}

/// Classification flags that select a prefix variant inside a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesFlags {
    #[serde(rename = "shipmentType", default)]
    pub shipment_type: Option<ShipmentType>,
    #[serde(rename = "shipmentDetail", default)]
    pub shipment_detail: Option<ShipmentDetail>,
}

impl SeriesFlags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shipment(shipment_type: ShipmentType, shipment_detail: Option<ShipmentDetail>) -> Self {
        Self {
            shipment_type: Some(shipment_type),
            shipment_detail,
        }
    }
}

/// Period embedded in the prefix of every code of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    /// Без периода: сквозная нумерация
    Continuous,
    /// `YYYY`
    Year,
    /// `YYYYMM`
    YearMonth,
}

/// How the numeric suffix is read back from the greatest stored code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceExtraction {
    /// The last `width` characters.
    FixedTail,
    /// The text after the last occurrence of the sequence separator.
    LastSegment,
}

/// How the next sequence number is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStrategy {
    /// Read the greatest stored code and add one. Not safe under concurrent
    /// issuance; collisions surface as duplicate-code insert failures.
    ScanMax,
    /// Atomic per-series counter row, seeded from the stored codes.
    #[default]
    Counter,
}

/// Описание серии для `GET /api/sequences`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub series: DocumentSeries,
    pub table: String,
    pub column: String,
    pub prefix: String,
    #[serde(rename = "variantPrefixes")]
    pub variant_prefixes: Vec<String>,
    pub bucket: TimeBucket,
    pub width: u8,
    pub extraction: SequenceExtraction,
    #[serde(rename = "sampleCode")]
    pub sample_code: String,
}

/// Запрос предварительного просмотра следующего номера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub series: DocumentSeries,
    #[serde(default)]
    pub flags: SeriesFlags,
    /// Дата документа (`YYYY-MM-DD`); по умолчанию сегодня
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
}

/// Номер, который получит следующий документ серии
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePreview {
    pub series: DocumentSeries,
    pub prefix: String,
    pub sequence: u32,
    pub code: String,
}

/// Результат заполнения счётчика из существующих документов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillEntry {
    pub series: DocumentSeries,
    pub prefix: String,
    pub seeded: u32,
}

/// Тело `POST /api/sequences/backfill`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillRequest {
    /// Период, для которого заполняются счётчики; по умолчанию текущий
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
}
