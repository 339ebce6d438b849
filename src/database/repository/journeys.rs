use chrono::{DateTime, Utc};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Budget, Journey, JourneySummary, JourneyView};
use crate::filter::{fold, FilterParam, FilterWhere, JourneyFilter};

const JOURNEY_COLUMNS: &str = "j.id, j.traveler_id, j.title, j.description, j.start_location, j.end_location, \
     j.start_date, j.end_date, j.duration, j.budget, j.highlights, j.transportation, j.images, j.videos, \
     j.views, j.rating, j.created_at, j.updated_at";

/// Every writable journey field. Used for both insert and full replacement on update.
#[derive(Debug, Clone)]
pub struct JourneyDraft {
    pub title: String,
    pub description: String,
    pub start_location: String,
    pub end_location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration: i64,
    pub budget: Budget,
    pub highlights: Vec<String>,
    pub transportation: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub rating: Option<i64>,
}

impl JourneyDraft {
    /// Every free-text value a search needle is matched against, folded
    fn search_terms(&self) -> Vec<String> {
        [&self.title, &self.description]
            .into_iter()
            .chain(&self.highlights)
            .chain(&self.transportation)
            .map(|term| fold(term))
            .collect()
    }
}

#[derive(Clone)]
pub struct JourneyRepository {
    pool: SqlitePool,
}

impl JourneyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Journey columns joined with the author summary; email only when asked for
    fn view_select(with_email: bool) -> String {
        format!(
            "SELECT {}, u.name AS traveler_name, u.profile_image AS traveler_profile_image, \
             u.bio AS traveler_bio, u.location AS traveler_location, {} AS traveler_email \
             FROM journeys j JOIN users u ON u.id = j.traveler_id",
            JOURNEY_COLUMNS,
            if with_email { "u.email" } else { "NULL" }
        )
    }

    pub async fn insert(&self, traveler_id: Uuid, draft: &JourneyDraft) -> Result<Journey, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO journeys (id, traveler_id, title, description, start_location, end_location,
                 start_date, end_date, duration, budget, highlights, transportation, images, videos,
                 start_location_folded, end_location_folded, search_terms_folded,
                 views, rating, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(id)
        .bind(traveler_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.start_location)
        .bind(&draft.end_location)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.duration)
        .bind(draft.budget)
        .bind(Json(&draft.highlights))
        .bind(Json(&draft.transportation))
        .bind(Json(&draft.images))
        .bind(Json(&draft.videos))
        .bind(fold(&draft.start_location))
        .bind(fold(&draft.end_location))
        .bind(Json(draft.search_terms()))
        .bind(draft.rating)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.select_404(id).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Journey>, DatabaseError> {
        let journey = sqlx::query_as::<_, Journey>(&format!("SELECT {} FROM journeys j WHERE j.id = ?", JOURNEY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(journey)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<Journey, DatabaseError> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Journey not found".to_string()))
    }

    pub async fn find_view(&self, id: Uuid, with_email: bool) -> Result<Option<JourneyView>, DatabaseError> {
        let sql = format!("{} WHERE j.id = ?", Self::view_select(with_email));
        let view = sqlx::query_as::<_, JourneyView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }

    /// Atomic `views + 1`. Returns false when the journey does not exist.
    pub async fn increment_views(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE journeys SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest first
    pub async fn list(&self, filter: &JourneyFilter) -> Result<Vec<JourneyView>, DatabaseError> {
        let where_sql = FilterWhere::generate(filter);
        let sql = format!(
            "{} WHERE {} ORDER BY j.created_at DESC, j.rowid DESC",
            Self::view_select(false),
            where_sql.clause
        );

        let mut query = sqlx::query_as::<_, JourneyView>(&sql);
        for param in where_sql.params {
            query = match param {
                FilterParam::Text(text) => query.bind(text),
                FilterParam::Timestamp(ts) => query.bind(ts),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn by_traveler(&self, traveler_id: Uuid) -> Result<Vec<JourneyView>, DatabaseError> {
        let sql = format!(
            "{} WHERE j.traveler_id = ? ORDER BY j.created_at DESC, j.rowid DESC",
            Self::view_select(false)
        );
        let journeys = sqlx::query_as::<_, JourneyView>(&sql)
            .bind(traveler_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(journeys)
    }

    /// Journeys bookmarked by `user_id`, most recently saved first
    pub async fn saved_by(&self, user_id: Uuid) -> Result<Vec<JourneyView>, DatabaseError> {
        let sql = format!(
            "{} JOIN saved_journeys s ON s.journey_id = j.id WHERE s.user_id = ? ORDER BY s.saved_at DESC, s.rowid DESC",
            Self::view_select(false)
        );
        let journeys = sqlx::query_as::<_, JourneyView>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(journeys)
    }

    /// Replace every writable field. `traveler_id`, `views` and `created_at` are untouched.
    pub async fn update(&self, id: Uuid, draft: &JourneyDraft) -> Result<Journey, DatabaseError> {
        let result = sqlx::query(
            "UPDATE journeys SET title = ?, description = ?, start_location = ?, end_location = ?,
                 start_date = ?, end_date = ?, duration = ?, budget = ?, highlights = ?, transportation = ?,
                 images = ?, videos = ?, start_location_folded = ?, end_location_folded = ?,
                 search_terms_folded = ?, rating = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.start_location)
        .bind(&draft.end_location)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.duration)
        .bind(draft.budget)
        .bind(Json(&draft.highlights))
        .bind(Json(&draft.transportation))
        .bind(Json(&draft.images))
        .bind(Json(&draft.videos))
        .bind(fold(&draft.start_location))
        .bind(fold(&draft.end_location))
        .bind(Json(draft.search_terms()))
        .bind(draft.rating)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Journey not found".to_string()));
        }
        self.select_404(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM journeys WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn summary(&self, id: Uuid) -> Result<Option<JourneySummary>, DatabaseError> {
        let summary = sqlx::query_as::<_, JourneySummary>(
            "SELECT id, title, start_location, end_location FROM journeys WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    /// Summaries for every id in `ids` that still exists
    pub async fn summaries(&self, ids: &[Uuid]) -> Result<Vec<JourneySummary>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT id, title, start_location, end_location FROM journeys WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        Ok(query.build_query_as::<JourneySummary>().fetch_all(&self.pool).await?)
    }
}
