// handlers/protected/mod.rs - routes behind access_guard
//
// Handlers read the resolved caller from the `AuthUser` extension.

pub mod auth;
pub mod chats;
pub mod journeys;
