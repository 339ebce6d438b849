// handlers/mod.rs - two-tier handler layout
//
// public:    no token required (registration, login, browsing journeys, health)
// protected: mounted behind access_guard, some routes also behind role_guard

pub mod protected;
pub mod public;

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::JourneyView;
use crate::error::ApiError;

/// Parse an id from a path segment or body field
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::validation(format!("Invalid {} id", what)))
}

#[derive(Debug, Serialize)]
pub struct JourneyList {
    pub count: usize,
    pub journeys: Vec<JourneyView>,
}

impl From<Vec<JourneyView>> for JourneyList {
    fn from(journeys: Vec<JourneyView>) -> Self {
        Self {
            count: journeys.len(),
            journeys,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JourneyBody {
    pub journey: JourneyView,
}
