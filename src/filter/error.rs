use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid date for '{field}': {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid date range: startDate is after endDate")]
    InvalidRange,
}
