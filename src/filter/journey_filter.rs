use chrono::{DateTime, Utc};

use super::error::FilterError;
use super::types::{JourneyQuery, TextMatch};
use crate::dates::parse_timestamp;

/// Parsed journey listing filter.
///
/// Text criteria are mutually exclusive: a route (from/to) wins over `search`,
/// which wins over `location`. The start-date range composes with any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyFilter {
    pub text: TextMatch,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
}

impl Default for JourneyFilter {
    fn default() -> Self {
        Self {
            text: TextMatch::All,
            starts_after: None,
            starts_before: None,
        }
    }
}

impl JourneyFilter {
    pub fn from_query(query: &JourneyQuery) -> Result<Self, FilterError> {
        let from = present(&query.from_location);
        let to = present(&query.to_location);

        let text = if from.is_some() || to.is_some() {
            TextMatch::Route { from, to }
        } else if let Some(search) = present(&query.search) {
            TextMatch::Search(search)
        } else if let Some(location) = present(&query.location) {
            TextMatch::Location(location)
        } else {
            TextMatch::All
        };

        let starts_after = present(&query.start_date)
            .map(|v| parse_timestamp(&v).ok_or(FilterError::InvalidDate { field: "startDate", value: v }))
            .transpose()?;
        let starts_before = present(&query.end_date)
            .map(|v| parse_timestamp(&v).ok_or(FilterError::InvalidDate { field: "endDate", value: v }))
            .transpose()?;

        if let (Some(after), Some(before)) = (starts_after, starts_before) {
            if after > before {
                return Err(FilterError::InvalidRange);
            }
        }

        Ok(Self {
            text,
            starts_after,
            starts_before,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.text == TextMatch::All && self.starts_after.is_none() && self.starts_before.is_none()
    }
}

/// Blank query parameters count as absent
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
