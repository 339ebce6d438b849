pub mod auth;
pub mod response;
pub mod role;

pub use auth::{access_guard, AuthUser, OptionalUser};
pub use response::{ApiResponse, ApiResult};
pub use role::{role_guard, AllowedRoles};
