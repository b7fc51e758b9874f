use crate::domain::common::validation::require_text;
use crate::domain::common::{AggregateRoot, BaseAggregate};
use crate::shared::numbering::{DocumentSeries, SeriesFlags, ShipmentDetail, ShipmentType};
use serde::{Deserialize, Serialize};

// ============================================================================
// ID Type
// ============================================================================
crate::uuid_aggregate_id!(SurveyId);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Акт осмотра груза. Номер (`base.code`) выдаётся серией `survey`,
/// префикс выбирается по типу и детализации перевозки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    #[serde(flatten)]
    pub base: BaseAggregate<SurveyId>,

    #[serde(rename = "shipmentType")]
    pub shipment_type: ShipmentType,

    #[serde(rename = "shipmentDetail")]
    pub shipment_detail: Option<ShipmentDetail>,

    #[serde(rename = "customerName")]
    pub customer_name: String,

    pub location: String,

    #[serde(rename = "surveyDate")]
    pub survey_date: chrono::NaiveDate,
}

impl Survey {
    pub fn new_for_insert(dto: &SurveyDto) -> Self {
        let mut base = BaseAggregate::new(SurveyId::new_v4(), String::new(), dto.description.clone());
        base.comment = dto.comment.clone();

        Self {
            base,
            shipment_type: dto.shipment_type,
            shipment_detail: dto.shipment_detail,
            customer_name: dto.customer_name.clone(),
            location: dto.location.clone(),
            survey_date: dto.survey_date,
        }
    }

    pub fn series_flags(&self) -> SeriesFlags {
        SeriesFlags::shipment(self.shipment_type, self.shipment_detail)
    }

    /// Номер и тип перевозки не меняются: префикс номера уже выдан по ним.
    pub fn update(&mut self, dto: &SurveyDto) {
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.customer_name = dto.customer_name.clone();
        self.location = dto.location.clone();
        self.survey_date = dto.survey_date;
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.base.description, "Описание груза")?;
        require_text(&self.customer_name, "Клиент")?;
        require_text(&self.location, "Место осмотра")?;
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Survey {
    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "survey"
    }

    fn numbering_series() -> &'static [DocumentSeries] {
        &[DocumentSeries::Survey]
    }
}

// ============================================================================
// DTO
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDto {
    pub id: Option<String>,
    pub description: String,
    #[serde(rename = "shipmentType")]
    pub shipment_type: ShipmentType,
    #[serde(rename = "shipmentDetail", default)]
    pub shipment_detail: Option<ShipmentDetail>,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    pub location: String,
    #[serde(rename = "surveyDate")]
    pub survey_date: chrono::NaiveDate,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> SurveyDto {
        SurveyDto {
            id: None,
            description: "20 pallets of ceramic tiles".into(),
            shipment_type: ShipmentType::Import,
            shipment_detail: Some(ShipmentDetail::Lcl),
            customer_name: "PT Samudra".into(),
            location: "Tanjung Priok, gate 3".into(),
            survey_date: chrono::NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(),
            comment: None,
        }
    }

    #[test]
    fn test_new_survey_has_no_code_yet() {
        let survey = Survey::new_for_insert(&dto());
        assert!(survey.base.code.is_empty());
        assert!(survey.validate().is_ok());
        assert_eq!(
            survey.series_flags(),
            SeriesFlags::shipment(ShipmentType::Import, Some(ShipmentDetail::Lcl))
        );
    }

    #[test]
    fn test_update_keeps_code_and_shipment() {
        let mut survey = Survey::new_for_insert(&dto());
        survey.base.assign_code("SIL-20240001".into());

        let mut changed = dto();
        changed.shipment_type = ShipmentType::Export;
        changed.location = "Warehouse B".into();
        survey.update(&changed);

        assert_eq!(survey.base.code, "SIL-20240001");
        assert_eq!(survey.shipment_type, ShipmentType::Import);
        assert_eq!(survey.location, "Warehouse B");
    }

    #[test]
    fn test_before_write_bumps_version() {
        let mut survey = Survey::new_for_insert(&dto());
        assert_eq!(survey.base.metadata.version, 0);
        survey.before_write();
        survey.before_write();
        assert_eq!(survey.base.metadata.version, 2);
    }

    #[test]
    fn test_validate_requires_location() {
        let mut d = dto();
        d.location = "  ".into();
        assert!(Survey::new_for_insert(&d).validate().is_err());
    }
}
