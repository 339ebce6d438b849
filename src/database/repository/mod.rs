mod chats;
mod journeys;
mod users;

pub use chats::ChatRepository;
pub use journeys::{JourneyDraft, JourneyRepository};
pub use users::{NewUser, UserRepository};
