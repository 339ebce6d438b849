use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Chat, ChatMessage, JourneySummary, ParticipantSummary, User};
use crate::database::{ChatRepository, JourneyRepository, UserRepository};
use crate::error::ApiError;
use crate::state::AppState;

/// Chat with its full message log
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetail {
    pub id: Uuid,
    pub participants: Vec<ParticipantSummary>,
    pub journey: Option<JourneySummary>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat list entry: the latest message only, plus what the caller has not read yet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPreview {
    pub id: Uuid,
    pub participants: Vec<ParticipantSummary>,
    pub journey: Option<JourneySummary>,
    pub last_message: Option<ChatMessage>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct ChatService {
    chats: ChatRepository,
    users: UserRepository,
    journeys: JourneyRepository,
}

impl ChatService {
    pub fn new(state: &AppState) -> Self {
        Self {
            chats: state.chats(),
            users: state.users(),
            journeys: state.journeys(),
        }
    }

    /// Returns the chat for the pair and whether it was created by this call
    pub async fn get_or_create(
        &self,
        caller: &User,
        participant_id: Uuid,
        journey_id: Option<Uuid>,
    ) -> Result<(ChatDetail, bool), ApiError> {
        if participant_id == caller.id {
            return Err(ApiError::validation("Cannot start a chat with yourself"));
        }
        if self.users.find_by_id(participant_id).await?.is_none() {
            return Err(ApiError::not_found("User not found"));
        }
        if let Some(journey_id) = journey_id {
            if self.journeys.find(journey_id).await?.is_none() {
                return Err(ApiError::not_found("Journey not found"));
            }
        }

        let (chat, created) = self.chats.get_or_create(caller.id, participant_id, journey_id).await?;
        if created {
            tracing::info!("Chat {} opened between {} and {}", chat.id, caller.id, participant_id);
        }

        let detail = self.detail(chat, false).await?;
        Ok((detail, created))
    }

    /// Previews for the polling client. The query count is fixed, whatever the number of chats.
    pub async fn list(&self, caller: &User) -> Result<Vec<ChatPreview>, ApiError> {
        let chats = self.chats.list_for(caller.id).await?;
        if chats.is_empty() {
            return Ok(vec![]);
        }

        let mut user_ids: Vec<Uuid> = chats.iter().flat_map(Chat::participants).collect();
        user_ids.sort();
        user_ids.dedup();
        let mut journey_ids: Vec<Uuid> = chats.iter().filter_map(|c| c.journey_id).collect();
        journey_ids.sort();
        journey_ids.dedup();

        let people: HashMap<Uuid, ParticipantSummary> = self
            .users
            .participants(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let journeys: HashMap<Uuid, JourneySummary> = self
            .journeys
            .summaries(&journey_ids)
            .await?
            .into_iter()
            .map(|j| (j.id, j))
            .collect();
        let mut last_messages = self.chats.last_messages_for(caller.id).await?;
        let unread = self.chats.unread_counts_for(caller.id).await?;

        Ok(chats
            .into_iter()
            .map(|chat| ChatPreview {
                participants: chat
                    .participants()
                    .iter()
                    .filter_map(|id| people.get(id).cloned())
                    .collect(),
                journey: chat.journey_id.and_then(|id| journeys.get(&id).cloned()),
                last_message: last_messages.remove(&chat.id),
                unread_count: unread.get(&chat.id).copied().unwrap_or(0),
                id: chat.id,
                created_at: chat.created_at,
                updated_at: chat.updated_at,
            })
            .collect())
    }

    /// Opening a chat marks everything the other participant sent as read
    pub async fn get(&self, chat_id: Uuid, caller: &User) -> Result<ChatDetail, ApiError> {
        let chat = self.participating(chat_id, caller, "view").await?;

        let flipped = self.chats.mark_read(chat.id, caller.id).await?;
        if flipped > 0 {
            tracing::debug!("Marked {} messages read in chat {}", flipped, chat.id);
        }

        self.detail(chat, true).await
    }

    pub async fn send(&self, chat_id: Uuid, caller: &User, content: Option<String>) -> Result<ChatMessage, ApiError> {
        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            return Err(ApiError::validation("Please provide message content"));
        };
        let chat = self.participating(chat_id, caller, "send message in").await?;

        Ok(self.chats.insert_message(chat.id, caller.id, &content).await?)
    }

    async fn participating(&self, chat_id: Uuid, caller: &User, action: &str) -> Result<Chat, ApiError> {
        let chat = self
            .chats
            .find(chat_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Chat not found"))?;

        if !chat.is_participant(caller.id) {
            tracing::warn!("User {} is not a participant of chat {}", caller.id, chat_id);
            return Err(ApiError::forbidden(format!("Not authorized to {} this chat", action)));
        }
        Ok(chat)
    }

    async fn detail(&self, chat: Chat, with_email: bool) -> Result<ChatDetail, ApiError> {
        Ok(ChatDetail {
            participants: self.participants(&chat, with_email).await?,
            journey: self.journey(&chat).await?,
            messages: self.chats.messages(chat.id).await?,
            id: chat.id,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        })
    }

    async fn participants(&self, chat: &Chat, with_email: bool) -> Result<Vec<ParticipantSummary>, ApiError> {
        let mut summaries = Vec::with_capacity(2);
        for id in chat.participants() {
            if let Some(summary) = self.users.participant(id, with_email).await? {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    async fn journey(&self, chat: &Chat) -> Result<Option<JourneySummary>, ApiError> {
        match chat.journey_id {
            Some(id) => Ok(self.journeys.summary(id).await?),
            None => Ok(None),
        }
    }
}
