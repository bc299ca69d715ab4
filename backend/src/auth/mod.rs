//! Authentication module
//!
//! Provides JWT-based authentication with bcrypt password hashing, plus the
//! ownership check used by mutating routes.

mod jwt;
mod middleware;
mod ownership;
mod password;

pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{authenticate, AuthError, AuthUser};
pub use ownership::authorize;
pub use password::PasswordService;
