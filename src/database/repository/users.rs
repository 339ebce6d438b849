use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Gender, ParticipantSummary, User, UserRole};

/// Validated registration data. `email` is expected lower-cased.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserRole,
    pub gender: Gender,
    pub profile_image: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, user_type, gender, profile_image, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.user_type)
        .bind(new_user.gender)
        .bind(&new_user.profile_image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::on_unique_violation(e, "Email already registered"))?;

        self.select_404(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn participant(
        &self,
        id: Uuid,
        with_email: bool,
    ) -> Result<Option<ParticipantSummary>, DatabaseError> {
        let summary = sqlx::query_as::<_, ParticipantSummary>(
            "SELECT id, name, profile_image, CASE WHEN ? THEN email END AS email FROM users WHERE id = ?",
        )
        .bind(with_email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    /// Email-free summaries for every id in `ids`, in no particular order
    pub async fn participants(&self, ids: &[Uuid]) -> Result<Vec<ParticipantSummary>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, profile_image, NULL AS email FROM users WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        Ok(query
            .build_query_as::<ParticipantSummary>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Bookmark a journey. A second save of the same journey is a `UniqueViolation`.
    pub async fn save_journey(&self, user_id: Uuid, journey_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO saved_journeys (user_id, journey_id, saved_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(journey_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UniqueViolation("Journey already saved".to_string()));
        }
        Ok(())
    }

    /// Returns whether a bookmark was removed
    pub async fn unsave_journey(&self, user_id: Uuid, journey_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM saved_journeys WHERE user_id = ? AND journey_id = ?")
            .bind(user_id)
            .bind(journey_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn saved_count(&self, user_id: Uuid) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM saved_journeys WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Append to the view history. Returns false when the journey was already recorded.
    pub async fn record_view(&self, user_id: Uuid, journey_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO viewed_journeys (user_id, journey_id, viewed_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(journey_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn viewed_count(&self, user_id: Uuid) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM viewed_journeys WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
