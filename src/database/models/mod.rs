pub mod chat;
pub mod journey;
pub mod user;

pub use chat::{Chat, ChatMessage, JourneySummary, Message, ParticipantSummary, SenderSummary};
pub use journey::{Budget, Journey, JourneyView, TravelerSummary};
pub use user::{Gender, User, UserProfile, UserRole};
