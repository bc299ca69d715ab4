//! User service for registration, login and identity lookup
//!
//! Both flows are strict pipelines: every check runs before the next step
//! and the first failure ends the request. Password hashing and
//! verification run on the blocking thread pool.

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use bookshelf_shared::types::{
    AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest, UserSummary,
};
use bookshelf_shared::validation::{normalize_email, normalize_username};
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and issue their first token
    pub async fn register(
        pool: &PgPool,
        tokens: &TokenService,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let req = RegisterRequest {
            username: normalize_username(&req.username),
            email: normalize_email(&req.email),
            ..req
        };
        req.validate()?;

        if UserRepository::email_exists(pool, &req.email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
        if UserRepository::username_exists(pool, &req.username).await? {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }

        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        // A concurrent registration can still win between the checks and
        // the insert; the unique constraint reports it as a conflict.
        let user = UserRepository::create(pool, &req.username, &req.email, &password_hash)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    warn!(username = %req.username, "Registration lost a uniqueness race");
                }
                ApiError::from(e)
            })?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Self::auth_response(tokens, &user, "Registration successful")
    }

    /// Check credentials and issue a token
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        req: LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let req = LoginRequest {
            username: normalize_username(&req.username),
            ..req
        };
        req.validate()?;

        // Unknown usernames cost one bcrypt round, same as a wrong password
        let user = UserRepository::find_by_username(pool, &req.username).await?;
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        let valid = PasswordService::verify_or_decoy_async(req.password, digest)
            .await
            .map_err(ApiError::Internal)?;

        let user = match user {
            None => {
                warn!(username = %req.username, "Login failed: unknown username");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Some(user) if !valid => {
                warn!(user_id = user.id, "Login failed: wrong password");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Some(user) => user,
        };

        info!(user_id = user.id, "User logged in");
        Self::auth_response(tokens, &user, "Login successful")
    }

    /// Look up the authenticated caller
    pub async fn current_user(pool: &PgPool, user_id: i64) -> Result<CurrentUserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(CurrentUserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        })
    }

    fn auth_response(
        tokens: &TokenService,
        user: &UserRecord,
        message: &str,
    ) -> Result<AuthResponse, ApiError> {
        let token = tokens
            .issue(user.id, &user.username)
            .map_err(ApiError::Internal)?;

        Ok(AuthResponse {
            message: message.to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.ttl_secs(),
            user: UserSummary {
                id: user.id,
                username: user.username.clone(),
            },
        })
    }
}
