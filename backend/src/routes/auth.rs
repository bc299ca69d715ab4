//! Authentication routes
//!
//! Provides endpoints for user registration, login and the current identity.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use bookshelf_shared::types::{AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = UserService::register(state.db(), state.tokens(), req).await?;
    Ok(Json(response))
}

/// Login with username and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = UserService::login(state.db(), state.tokens(), req).await?;
    Ok(Json(response))
}

/// GET /api/v1/auth/me
async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = UserService::current_user(state.db(), auth_user.user_id).await?;
    Ok(Json(user))
}
