use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::UserRole;
use crate::error::ApiError;

/// Allow-set for `role_guard`, passed as the middleware's state
#[derive(Clone, Copy, Debug)]
pub struct AllowedRoles(pub &'static [UserRole]);

impl AllowedRoles {
    pub const TRAVELER: AllowedRoles = AllowedRoles(&[UserRole::Traveler]);
    pub const SEEKER: AllowedRoles = AllowedRoles(&[UserRole::Seeker]);

    pub fn check(&self, role: UserRole) -> Result<(), ApiError> {
        if self.0.contains(&role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "User role {} is not authorized to access this route",
                role
            )))
        }
    }
}

/// Restricts a route to the given roles. Must be layered inside `access_guard`.
pub async fn role_guard(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth) = request.extensions().get::<AuthUser>() else {
        tracing::error!("role_guard on {} runs without access_guard", request.uri().path());
        return Err(ApiError::unauthenticated("Not authorized to access this route"));
    };

    if let Err(e) = allowed.check(auth.user.user_type) {
        tracing::warn!("Forbidden {} {} for {}", request.method(), request.uri().path(), auth.id);
        return Err(e);
    }

    Ok(next.run(request).await)
}
