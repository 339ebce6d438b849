use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{ChatRepository, JourneyRepository, UserRepository};

/// Shared handler state. Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self {
            pool,
            config: Arc::new(config),
            tokens,
        }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn journeys(&self) -> JourneyRepository {
        JourneyRepository::new(self.pool.clone())
    }

    pub fn chats(&self) -> ChatRepository {
        ChatRepository::new(self.pool.clone())
    }
}
