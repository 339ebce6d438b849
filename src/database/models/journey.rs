use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Budget {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "budget" => Ok(Budget::Budget),
            "moderate" => Ok(Budget::Moderate),
            "luxury" => Ok(Budget::Luxury),
            other => Err(format!("Unknown budget tier '{}'", other)),
        }
    }
}

/// A travel post. `traveler_id` is fixed at creation and is the only account allowed to edit it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: Uuid,
    pub traveler_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_location: String,
    pub end_location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration: i64,
    pub budget: Budget,
    pub highlights: Json<Vec<String>>,
    pub transportation: Json<Vec<String>>,
    pub images: Json<Vec<String>>,
    pub videos: Json<Vec<String>>,
    pub views: i64,
    pub rating: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author details joined onto a journey. Columns are aliased `traveler_*` in queries.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TravelerSummary {
    #[sqlx(rename = "traveler_id")]
    pub id: Uuid,
    #[sqlx(rename = "traveler_name")]
    pub name: String,
    #[sqlx(rename = "traveler_profile_image")]
    pub profile_image: Option<String>,
    #[sqlx(rename = "traveler_bio")]
    pub bio: String,
    #[sqlx(rename = "traveler_location")]
    pub location: String,
    #[sqlx(rename = "traveler_email")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Journey with its author populated
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JourneyView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub journey: Journey,
    #[sqlx(flatten)]
    pub traveler: TravelerSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_defaults_to_moderate() {
        assert_eq!(Budget::default(), Budget::Moderate);
        assert_eq!("LUXURY".parse::<Budget>().unwrap(), Budget::Luxury);
        assert!("cheap".parse::<Budget>().is_err());
    }
}
