pub mod password;
pub mod token;

pub use password::{hash_password, hash_password_async, verify_password, verify_password_async, PasswordError};
pub use token::{Claims, JwtError, TokenService};
