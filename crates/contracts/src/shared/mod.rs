pub mod logger;
pub mod numbering;
