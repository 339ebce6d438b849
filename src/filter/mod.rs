pub mod error;
pub mod filter_where;
pub mod journey_filter;
pub mod types;

pub use error::FilterError;
pub use filter_where::{fold, FilterWhere};
pub use journey_filter::JourneyFilter;
pub use types::*;
