// handlers/public/mod.rs - routes reachable without a bearer token

pub mod auth;
pub mod health;
pub mod journeys;
