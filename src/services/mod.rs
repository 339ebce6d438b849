pub mod auth_service;
pub mod chat_service;
pub mod journey_service;

pub use auth_service::{AuthService, LoginRequest, RegisterRequest, Session};
pub use chat_service::{ChatDetail, ChatPreview, ChatService};
pub use journey_service::{JourneyInput, JourneyService};
