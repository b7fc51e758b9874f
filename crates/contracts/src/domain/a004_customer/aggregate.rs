use crate::domain::common::validation::{require_text, validate_email};
use crate::domain::common::{AggregateRoot, BaseAggregate};
use crate::shared::numbering::DocumentSeries;
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(CustomerId);

/// Клиент (справочник). Код `CUS-00001` выдаётся сквозной серией `customer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(flatten)]
    pub base: BaseAggregate<CustomerId>,

    #[serde(rename = "taxId", default)]
    pub tax_id: String,

    #[serde(default)]
    pub phone: String,

    pub email: Option<String>,

    #[serde(default)]
    pub address: String,
}

impl Customer {
    pub fn new_for_insert(dto: &CustomerDto) -> Self {
        let mut base = BaseAggregate::new(CustomerId::new_v4(), String::new(), dto.description.clone());
        base.comment = dto.comment.clone();

        Self {
            base,
            tax_id: dto.tax_id.clone().unwrap_or_default(),
            phone: dto.phone.clone().unwrap_or_default(),
            email: normalize_email(&dto.email),
            address: dto.address.clone().unwrap_or_default(),
        }
    }

    pub fn update(&mut self, dto: &CustomerDto) {
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.tax_id = dto.tax_id.clone().unwrap_or_default();
        self.phone = dto.phone.clone().unwrap_or_default();
        self.email = normalize_email(&dto.email);
        self.address = dto.address.clone().unwrap_or_default();
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.base.description, "Наименование")?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

fn normalize_email(email: &Option<String>) -> Option<String> {
    email
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl AggregateRoot for Customer {
    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "customer"
    }

    fn numbering_series() -> &'static [DocumentSeries] {
        &[DocumentSeries::Customer]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerDto {
    pub id: Option<String>,
    pub description: String,
    #[serde(rename = "taxId")]
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comment: Option<String>,
}
