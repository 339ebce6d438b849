// handlers/protected/chats.rs - /api/chats

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::ChatMessage;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ChatDetail, ChatPreview, ChatService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub participant_id: Option<String>,
    pub journey_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatBody {
    pub chat: ChatDetail,
}

#[derive(Debug, Serialize)]
pub struct ChatList {
    pub count: usize,
    pub chats: Vec<ChatPreview>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: ChatMessage,
}

/// POST /api/chats - 201 when the chat is new, 200 when the pair already had one
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateChatRequest>,
) -> ApiResult<ChatBody> {
    let participant_id = match body.participant_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_id(raw, "participant")?,
        _ => return Err(ApiError::validation("Please provide participant ID")),
    };
    let journey_id = match body.journey_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw, "journey")?),
        _ => None,
    };

    let (chat, created) = ChatService::new(&state)
        .get_or_create(&auth.user, participant_id, journey_id)
        .await?;

    let body = ChatBody { chat };
    if created {
        Ok(ApiResponse::created(body))
    } else {
        Ok(ApiResponse::success(body))
    }
}

/// GET /api/chats
pub async fn list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<ChatList> {
    let chats = ChatService::new(&state).list(&auth.user).await?;
    Ok(ApiResponse::success(ChatList {
        count: chats.len(),
        chats,
    }))
}

/// GET /api/chats/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ChatBody> {
    let id = parse_id(&id, "chat")?;
    let chat = ChatService::new(&state).get(id, &auth.user).await?;
    Ok(ApiResponse::success(ChatBody { chat }))
}

/// POST /api/chats/:id/message
pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> ApiResult<MessageBody> {
    let id = parse_id(&id, "chat")?;
    let message = ChatService::new(&state).send(id, &auth.user, body.content).await?;
    Ok(ApiResponse::created(MessageBody { message }))
}
