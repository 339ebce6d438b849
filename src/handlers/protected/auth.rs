// handlers/protected/auth.rs - GET /api/auth/me

use axum::Extension;

use crate::database::models::UserProfile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(UserProfile::from(&auth.user)))
}
