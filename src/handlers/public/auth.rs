// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};

use crate::error::ApiError;
use crate::media::MultipartForm;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthService, LoginRequest, RegisterRequest, Session};
use crate::state::AppState;

/// POST /api/auth/register - multipart (with optional avatar image) or JSON
pub async fn register(State(state): State<AppState>, request: Request) -> ApiResult<Session> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let input = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        let form = MultipartForm::parse(multipart, &state.config.upload).await?;
        RegisterRequest::from_form(&form)
    } else {
        let Json(body) = Json::<RegisterRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        body
    };

    let session = AuthService::new(&state).register(input).await?;
    Ok(ApiResponse::created(session))
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<Session> {
    let session = AuthService::new(&state).login(body).await?;
    Ok(ApiResponse::success(session))
}
