// handlers/protected/journeys.rs - journey authoring and bookmarks
//
// POST   /api/journeys                (traveler)
// PUT    /api/journeys/:id            (traveler, owner)
// DELETE /api/journeys/:id            (traveler, owner)
// GET    /api/journeys/my-journeys    (traveler)
// POST   /api/journeys/save|unsave    (seeker)
// GET    /api/journeys/saved/all      (seeker)
// GET    /api/journeys/viewed/count

use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{parse_id, JourneyBody, JourneyList};
use crate::media::MultipartForm;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::JourneyService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub journey_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCount {
    pub message: &'static str,
    pub saved_count: i64,
}

#[derive(Debug, Serialize)]
pub struct Count {
    pub count: i64,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<JourneyBody> {
    let form = MultipartForm::parse(multipart, &state.config.upload).await?;
    let journey = JourneyService::new(&state).create(&auth.user, &form).await?;
    Ok(ApiResponse::created(JourneyBody { journey }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<JourneyBody> {
    let id = parse_id(&id, "journey")?;
    let form = MultipartForm::parse(multipart, &state.config.upload).await?;
    let journey = JourneyService::new(&state).update(id, &auth.user, &form).await?;
    Ok(ApiResponse::success(JourneyBody { journey }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "journey")?;
    JourneyService::new(&state).delete(id, &auth.user).await?;
    Ok(ApiResponse::success(json!({ "message": "Journey deleted successfully" })))
}

pub async fn mine(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<JourneyList> {
    let journeys = JourneyService::new(&state).mine(&auth.user).await?;
    Ok(ApiResponse::success(journeys.into()))
}

pub async fn save(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SaveRequest>,
) -> ApiResult<SavedCount> {
    let journey_id = body_journey_id(body)?;
    let saved_count = JourneyService::new(&state).save(&auth.user, journey_id).await?;
    Ok(ApiResponse::success(SavedCount {
        message: "Journey saved successfully",
        saved_count,
    }))
}

pub async fn unsave(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SaveRequest>,
) -> ApiResult<SavedCount> {
    let journey_id = body_journey_id(body)?;
    let saved_count = JourneyService::new(&state).unsave(&auth.user, journey_id).await?;
    Ok(ApiResponse::success(SavedCount {
        message: "Journey unsaved successfully",
        saved_count,
    }))
}

pub async fn saved(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<JourneyList> {
    let journeys = JourneyService::new(&state).saved(&auth.user).await?;
    Ok(ApiResponse::success(journeys.into()))
}

pub async fn viewed_count(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Count> {
    let count = JourneyService::new(&state).viewed_count(&auth.user).await?;
    Ok(ApiResponse::success(Count { count }))
}

fn body_journey_id(body: SaveRequest) -> Result<uuid::Uuid, ApiError> {
    match body.journey_id {
        Some(raw) if !raw.trim().is_empty() => parse_id(&raw, "journey"),
        _ => Err(ApiError::validation("Please provide journey ID")),
    }
}
