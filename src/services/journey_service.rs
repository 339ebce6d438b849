use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{Budget, Journey, JourneyView, User};
use crate::database::{JourneyDraft, JourneyRepository, UserRepository};
use crate::dates::{duration_days, parse_timestamp};
use crate::error::ApiError;
use crate::filter::{JourneyFilter, JourneyQuery};
use crate::media::{parse_list, Media, MultipartForm};
use crate::state::AppState;

/// Validated journey form. Create and update both take the full field set.
#[derive(Debug, Clone)]
pub struct JourneyInput {
    pub title: String,
    pub description: String,
    pub start_location: String,
    pub end_location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: Budget,
    pub highlights: Vec<String>,
    pub transportation: Vec<String>,
    pub rating: Option<i64>,
    pub existing_images: Vec<String>,
    pub existing_videos: Vec<String>,
}

impl JourneyInput {
    pub fn from_form(form: &MultipartForm) -> Result<Self, ApiError> {
        let (Some(title), Some(description), Some(start_location), Some(end_location)) = (
            form.text("title"),
            form.text("description"),
            form.text("startLocation"),
            form.text("endLocation"),
        ) else {
            return Err(ApiError::validation("Please provide all required fields"));
        };

        let (Some(start_raw), Some(end_raw)) = (form.text("startDate"), form.text("endDate")) else {
            return Err(ApiError::validation("Please provide all required fields"));
        };
        let (Some(start_date), Some(end_date)) = (parse_timestamp(&start_raw), parse_timestamp(&end_raw)) else {
            return Err(ApiError::validation("Invalid date format"));
        };
        if end_date < start_date {
            return Err(ApiError::validation("End date cannot be before start date"));
        }

        let budget = match form.text("budget") {
            Some(raw) => raw.parse().map_err(ApiError::validation)?,
            None => Budget::default(),
        };

        let rating = match form.text("rating") {
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| ApiError::validation("Rating must be a whole number"))?;
                if !(1..=5).contains(&value) {
                    return Err(ApiError::validation("Rating must be between 1 and 5"));
                }
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            title,
            description,
            start_location,
            end_location,
            start_date,
            end_date,
            budget,
            highlights: parse_list(&form.values("highlights")),
            transportation: parse_list(&form.values("transportation")),
            rating,
            existing_images: parse_list(&form.values("existingImages")),
            existing_videos: parse_list(&form.values("existingVideos")),
        })
    }

    pub fn duration(&self) -> i64 {
        duration_days(self.start_date, self.end_date)
    }

    fn into_draft(self, images: Vec<String>, videos: Vec<String>) -> JourneyDraft {
        JourneyDraft {
            duration: self.duration(),
            title: self.title,
            description: self.description,
            start_location: self.start_location,
            end_location: self.end_location,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            highlights: self.highlights,
            transportation: self.transportation,
            images,
            videos,
            rating: self.rating,
        }
    }
}

/// Journey operations with ownership checks and view tracking
pub struct JourneyService {
    journeys: JourneyRepository,
    users: UserRepository,
}

impl JourneyService {
    pub fn new(state: &AppState) -> Self {
        Self {
            journeys: state.journeys(),
            users: state.users(),
        }
    }

    pub async fn create(&self, caller: &User, form: &MultipartForm) -> Result<JourneyView, ApiError> {
        let input = JourneyInput::from_form(form)?;
        let media = Media::from_files(form.files());

        let journey = self
            .journeys
            .insert(caller.id, &input.into_draft(media.images, media.videos))
            .await?;
        tracing::info!("Journey {} created by {}", journey.id, caller.id);

        self.view(journey.id, false).await
    }

    pub async fn list(&self, query: &JourneyQuery) -> Result<Vec<JourneyView>, ApiError> {
        let filter = JourneyFilter::from_query(query)?;
        Ok(self.journeys.list(&filter).await?)
    }

    /// Every fetch counts as a view. A seeker's first fetch is also added to their history.
    pub async fn get(&self, id: Uuid, viewer: Option<&User>) -> Result<JourneyView, ApiError> {
        if !self.journeys.increment_views(id).await? {
            return Err(ApiError::not_found("Journey not found"));
        }

        if let Some(seeker) = viewer.filter(|u| u.is_seeker()) {
            if let Err(e) = self.users.record_view(seeker.id, id).await {
                tracing::warn!("Could not record view of {} by {}: {}", id, seeker.id, e);
            }
        }

        self.view(id, true).await
    }

    pub async fn update(&self, id: Uuid, caller: &User, form: &MultipartForm) -> Result<JourneyView, ApiError> {
        let journey = self.owned(id, caller, "update").await?;
        let input = JourneyInput::from_form(form)?;
        let media = Media::from_files(form.files());

        let mut images = retained(&input.existing_images, &journey.images.0, "existingImages")?;
        let mut videos = retained(&input.existing_videos, &journey.videos.0, "existingVideos")?;
        images.extend(media.images);
        videos.extend(media.videos);

        self.journeys.update(id, &input.into_draft(images, videos)).await?;
        tracing::info!("Journey {} updated by {}", id, caller.id);

        self.view(id, false).await
    }

    pub async fn delete(&self, id: Uuid, caller: &User) -> Result<(), ApiError> {
        self.owned(id, caller, "delete").await?;
        self.journeys.delete(id).await?;
        tracing::info!("Journey {} deleted by {}", id, caller.id);
        Ok(())
    }

    pub async fn mine(&self, caller: &User) -> Result<Vec<JourneyView>, ApiError> {
        Ok(self.journeys.by_traveler(caller.id).await?)
    }

    /// Returns the caller's saved count afterwards
    pub async fn save(&self, caller: &User, journey_id: Uuid) -> Result<i64, ApiError> {
        if self.journeys.find(journey_id).await?.is_none() {
            return Err(ApiError::not_found("Journey not found"));
        }
        self.users.save_journey(caller.id, journey_id).await?;
        Ok(self.users.saved_count(caller.id).await?)
    }

    /// Removing a journey that was never saved is not an error
    pub async fn unsave(&self, caller: &User, journey_id: Uuid) -> Result<i64, ApiError> {
        self.users.unsave_journey(caller.id, journey_id).await?;
        Ok(self.users.saved_count(caller.id).await?)
    }

    pub async fn saved(&self, caller: &User) -> Result<Vec<JourneyView>, ApiError> {
        Ok(self.journeys.saved_by(caller.id).await?)
    }

    pub async fn viewed_count(&self, caller: &User) -> Result<i64, ApiError> {
        Ok(self.users.viewed_count(caller.id).await?)
    }

    async fn owned(&self, id: Uuid, caller: &User, action: &str) -> Result<Journey, ApiError> {
        let journey = self.journeys.select_404(id).await?;
        if journey.traveler_id != caller.id {
            tracing::warn!("User {} tried to {} journey {} owned by {}", caller.id, action, id, journey.traveler_id);
            return Err(ApiError::forbidden(format!("Not authorized to {} this journey", action)));
        }
        Ok(journey)
    }

    async fn view(&self, id: Uuid, with_email: bool) -> Result<JourneyView, ApiError> {
        self.journeys
            .find_view(id, with_email)
            .await?
            .ok_or_else(|| ApiError::not_found("Journey not found"))
    }
}

/// The caller's retention list, provided every entry is already stored on the journey.
/// Each stored copy can be kept at most once; surplus repeats are dropped.
fn retained(requested: &[String], stored: &[String], field: &str) -> Result<Vec<String>, ApiError> {
    let mut available: HashMap<&str, usize> = HashMap::new();
    for item in stored {
        *available.entry(item.as_str()).or_default() += 1;
    }

    let mut kept = Vec::with_capacity(requested.len());
    for (index, item) in requested.iter().enumerate() {
        match available.get_mut(item.as_str()) {
            None => {
                tracing::warn!("{} entry {} is not stored on the journey", field, index);
                return Err(ApiError::validation(format!(
                    "{} may only reference media already stored on this journey",
                    field
                )));
            }
            Some(0) => tracing::debug!("Dropping repeated {} entry {}", field, index),
            Some(remaining) => {
                *remaining -= 1;
                kept.push(item.clone());
            }
        }
    }
    Ok(kept)
}
