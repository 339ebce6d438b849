use serde::{Deserialize, Serialize};

use crate::auth::{hash_password_async, verify_password_async};
use crate::database::models::{Gender, User, UserProfile, UserRole};
use crate::database::NewUser;
use crate::error::ApiError;
use crate::media::{MediaKind, MultipartForm};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration fields, from either a JSON body or a multipart form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    #[serde(skip)]
    pub profile_image: Option<String>,
}

impl RegisterRequest {
    /// An image sent as `avatar` becomes the profile image, else the first image part of any name
    pub fn from_form(form: &MultipartForm) -> Self {
        let images: Vec<_> = form
            .files()
            .iter()
            .filter(|f| MediaKind::classify(&f.content_type) == Some(MediaKind::Image))
            .collect();
        let profile_image = images
            .iter()
            .find(|f| f.field == "avatar")
            .or_else(|| images.first())
            .map(|f| f.to_data_url());

        Self {
            name: form.text("name"),
            email: form.text("email"),
            password: form.raw("password"),
            user_type: form.text("userType"),
            gender: form.text("gender"),
            profile_image,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token plus the profile it was issued for
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

pub struct AuthService {
    state: AppState,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Session, ApiError> {
        let (Some(name), Some(email), Some(password), Some(user_type), Some(gender)) = (
            non_blank(request.name),
            non_blank(request.email),
            request.password.filter(|p| !p.is_empty()),
            non_blank(request.user_type),
            non_blank(request.gender),
        ) else {
            return Err(ApiError::validation("Please provide all required fields"));
        };

        let email = email.to_lowercase();
        if !looks_like_email(&email) {
            return Err(ApiError::validation("Please provide a valid email"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let user_type: UserRole = user_type.parse().map_err(ApiError::validation)?;
        let gender: Gender = gender.parse().map_err(ApiError::validation)?;

        let users = self.state.users();
        if users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("Email already registered"));
        }

        let user = users
            .create(NewUser {
                name,
                email,
                password_hash: hash_password_async(password).await?,
                user_type,
                gender,
                profile_image: request.profile_image,
            })
            .await?;

        tracing::info!("Registered {} {}", user.user_type, user.id);
        self.session_for(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Session, ApiError> {
        let (Some(email), Some(password)) = (
            non_blank(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(ApiError::validation("Please provide email and password"));
        };

        let user = match self.state.users().find_by_email(&email).await? {
            Some(user) => {
                let matched = verify_password_async(password, user.password_hash.clone()).await;
                matched.then_some(user)
            }
            None => None,
        };
        let Some(user) = user else {
            tracing::warn!("Failed login attempt");
            return Err(ApiError::unauthenticated("Invalid credentials"));
        };

        self.session_for(&user)
    }

    fn session_for(&self, user: &User) -> Result<Session, ApiError> {
        Ok(Session {
            token: self.state.tokens.issue(user.id)?,
            user: UserProfile::from(user),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
