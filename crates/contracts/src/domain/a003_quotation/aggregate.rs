use crate::domain::common::validation::{require_positive, require_text, validate_currency};
use crate::domain::common::{AggregateRoot, BaseAggregate};
use crate::shared::numbering::DocumentSeries;
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(QuotationId);

/// Коммерческое предложение клиенту на перевозку
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    #[serde(flatten)]
    pub base: BaseAggregate<QuotationId>,

    #[serde(rename = "customerName")]
    pub customer_name: String,

    pub amount: f64,

    pub currency: String,

    #[serde(rename = "validUntil")]
    pub valid_until: chrono::NaiveDate,
}

impl Quotation {
    pub fn new_for_insert(dto: &QuotationDto) -> Self {
        let mut base = BaseAggregate::new(QuotationId::new_v4(), String::new(), dto.description.clone());
        base.comment = dto.comment.clone();

        Self {
            base,
            customer_name: dto.customer_name.clone(),
            amount: dto.amount,
            currency: dto.currency.trim().to_string(),
            valid_until: dto.valid_until,
        }
    }

    pub fn update(&mut self, dto: &QuotationDto) {
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.customer_name = dto.customer_name.clone();
        self.amount = dto.amount;
        self.currency = dto.currency.trim().to_string();
        self.valid_until = dto.valid_until;
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.base.description, "Описание")?;
        require_text(&self.customer_name, "Клиент")?;
        require_positive(self.amount, "Сумма")?;
        validate_currency(&self.currency)?;
        if self.valid_until < self.base.metadata.created_at.date_naive() {
            return Err("Срок действия не может быть раньше даты создания".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Quotation {
    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "quotation"
    }

    fn numbering_series() -> &'static [DocumentSeries] {
        &[DocumentSeries::Quotation]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationDto {
    pub id: Option<String>,
    pub description: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "validUntil")]
    pub valid_until: chrono::NaiveDate,
    pub comment: Option<String>,
}
