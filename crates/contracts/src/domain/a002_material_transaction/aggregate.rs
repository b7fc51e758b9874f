use crate::domain::common::validation::{require_positive, require_text};
use crate::domain::common::{AggregateRoot, BaseAggregate};
use crate::shared::numbering::DocumentSeries;
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(MaterialTransactionId);

/// Направление движения материала
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialDirection {
    In,
    Out,
}

impl MaterialDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialDirection::In => "in",
            MaterialDirection::Out => "out",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MaterialDirection::In),
            "out" => Some(MaterialDirection::Out),
            _ => None,
        }
    }

    /// Приход и расход нумеруются независимо
    pub fn series(&self) -> DocumentSeries {
        match self {
            MaterialDirection::In => DocumentSeries::MaterialIn,
            MaterialDirection::Out => DocumentSeries::MaterialOut,
        }
    }
}

/// Документ движения материалов (приход / расход склада)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTransaction {
    #[serde(flatten)]
    pub base: BaseAggregate<MaterialTransactionId>,

    pub direction: MaterialDirection,

    #[serde(rename = "materialName")]
    pub material_name: String,

    pub quantity: f64,

    pub unit: String,

    pub warehouse: String,

    #[serde(rename = "transactionDate")]
    pub transaction_date: chrono::NaiveDate,
}

impl MaterialTransaction {
    pub fn new_for_insert(dto: &MaterialTransactionDto) -> Self {
        let mut base = BaseAggregate::new(
            MaterialTransactionId::new_v4(),
            String::new(),
            dto.description.clone(),
        );
        base.comment = dto.comment.clone();

        Self {
            base,
            direction: dto.direction,
            material_name: dto.material_name.clone(),
            quantity: dto.quantity,
            unit: dto.unit.clone(),
            warehouse: dto.warehouse.clone(),
            transaction_date: dto.transaction_date,
        }
    }

    /// Направление задаёт серию номера и после создания не меняется.
    pub fn update(&mut self, dto: &MaterialTransactionDto) {
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.material_name = dto.material_name.clone();
        self.quantity = dto.quantity;
        self.unit = dto.unit.clone();
        self.warehouse = dto.warehouse.clone();
        self.transaction_date = dto.transaction_date;
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.material_name, "Материал")?;
        require_text(&self.unit, "Единица измерения")?;
        require_text(&self.warehouse, "Склад")?;
        require_positive(self.quantity, "Количество")?;
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for MaterialTransaction {
    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "material_transaction"
    }

    fn numbering_series() -> &'static [DocumentSeries] {
        &[DocumentSeries::MaterialIn, DocumentSeries::MaterialOut]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTransactionDto {
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub direction: MaterialDirection,
    #[serde(rename = "materialName")]
    pub material_name: String,
    pub quantity: f64,
    pub unit: String,
    pub warehouse: String,
    #[serde(rename = "transactionDate")]
    pub transaction_date: chrono::NaiveDate,
    pub comment: Option<String>,
}
