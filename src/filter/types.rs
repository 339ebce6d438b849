use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw query string accepted by `GET /journeys`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyQuery {
    pub search: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Which text criterion applies. Exactly one is chosen, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Origin and/or destination substring, ANDed when both are given
    Route {
        from: Option<String>,
        to: Option<String>,
    },
    /// Title, description, any highlight or any transportation entry
    Search(String),
    /// Origin or destination
    Location(String),
    All,
}

/// Bound value for a rendered condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub clause: String,
    pub params: Vec<FilterParam>,
}
