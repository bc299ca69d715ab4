//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Authentication
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "must be between 3 and 30 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, max = 128, message = "must be between 8 and 128 characters"),
        custom(function = "crate::validation::validate_password_bytes")
    )]
    pub password: String,
    /// Password confirmation
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password2: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 30, message = "must be between 3 and 30 characters"))]
    pub username: String,
    #[validate(
        length(min = 8, max = 128, message = "must be between 8 and 128 characters"),
        custom(function = "crate::validation::validate_password_bytes")
    )]
    pub password: String,
}

/// Public identity of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserSummary,
}

/// The authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Books
// ============================================================================

/// A book together with its creator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub name: String,
    pub author: String,
    /// Relative path of the cover image inside the upload directory
    pub image: String,
    pub creator: UserSummary,
}

/// Returned by book create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMutationResponse {
    pub message: String,
    pub book: BookResponse,
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub avatar: String,
    pub bio: String,
}

/// Public view of a user, their profile and their books
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfileResponse {
    pub id: i64,
    pub username: String,
    pub profile: ProfileInfo,
    pub books: Vec<BookResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub profile: ProfileInfo,
}
