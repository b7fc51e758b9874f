pub mod a001_survey;
pub mod a002_material_transaction;
pub mod a003_quotation;
pub mod a004_customer;
