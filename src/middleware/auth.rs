use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved by `access_guard` and stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub user: User,
}

/// Bearer token middleware.
///
/// Missing, malformed or invalid tokens are 401. A valid token whose user no
/// longer exists is 404, so clients can tell a stale account from a bad token.
pub async fn access_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(|msg| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthenticated("Not authorized to access this route")
    })?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let user = state
        .users()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for missing user {}", user_id);
            ApiError::not_found("User not found")
        })?;

    tracing::debug!("Authenticated {} as {}", user.id, user.user_type);
    request.extensions_mut().insert(AuthUser { id: user.id, user });

    Ok(next.run(request).await)
}

/// Best-effort identity for public routes. Any failure resolves to anonymous.
#[derive(Clone, Debug)]
pub struct OptionalUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Ok(token) = extract_bearer(&parts.headers) else {
            return Ok(OptionalUser(None));
        };

        let user_id = match state.tokens.verify(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Ignoring unusable token on public route: {}", e);
                return Ok(OptionalUser(None));
            }
        };

        match state.users().find_by_id(user_id).await {
            Ok(user) => Ok(OptionalUser(user)),
            Err(e) => {
                tracing::warn!("Could not resolve optional user {}: {}", user_id, e);
                Ok(OptionalUser(None))
            }
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
