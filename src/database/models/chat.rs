use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Two-party conversation. The pair is stored normalised (`participant_low < participant_high`).
#[derive(Debug, Clone, FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub journey_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Order a participant pair the way the uniqueness constraint expects it
    pub fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn participants(&self) -> [Uuid; 2] {
        [self.participant_low, self.participant_high]
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_low == user_id || self.participant_high == user_id
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    #[serde(rename = "read")]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Sender details joined onto a message. Columns are aliased `sender_*` in queries.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SenderSummary {
    #[sqlx(rename = "sender_id")]
    pub id: Uuid,
    #[sqlx(rename = "sender_name")]
    pub name: String,
    #[sqlx(rename = "sender_profile_image")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatMessage {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: Message,
    #[sqlx(flatten)]
    pub sender: SenderSummary,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JourneySummary {
    pub id: Uuid,
    pub title: String,
    pub start_location: String,
    pub end_location: String,
}
