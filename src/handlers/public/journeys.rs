// handlers/public/journeys.rs - GET /api/journeys, GET /api/journeys/:id

use axum::extract::{Path, Query, State};

use crate::filter::JourneyQuery;
use crate::handlers::{parse_id, JourneyBody, JourneyList};
use crate::middleware::{ApiResponse, ApiResult, OptionalUser};
use crate::services::JourneyService;
use crate::state::AppState;

/// GET /api/journeys - filtered listing, newest first
pub async fn list(State(state): State<AppState>, Query(query): Query<JourneyQuery>) -> ApiResult<JourneyList> {
    let journeys = JourneyService::new(&state).list(&query).await?;
    Ok(ApiResponse::success(journeys.into()))
}

/// GET /api/journeys/:id - counts a view; a signed-in seeker's history is updated too
pub async fn get(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<JourneyBody> {
    let id = parse_id(&id, "journey")?;
    let journey = JourneyService::new(&state).get(id, viewer.as_ref()).await?;
    Ok(ApiResponse::success(JourneyBody { journey }))
}
