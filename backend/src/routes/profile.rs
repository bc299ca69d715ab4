//! Profile routes

use super::extract::ApiPath;
use super::forms::read_upload_form;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{ProfileForm, ProfileService};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, put},
    Json, Router,
};
use bookshelf_shared::types::{ProfileUpdateResponse, PublicProfileResponse};

/// Create profile routes
pub fn profile_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", put(update_profile))
        .route("/:user_id", get(get_profile))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Public profile with the user's books
///
/// GET /api/v1/profile/:user_id
async fn get_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<PublicProfileResponse>> {
    let profile = ProfileService::get_public(state.db(), user_id).await?;
    Ok(Json(profile))
}

/// Update the caller's profile (multipart: bio, avatar)
///
/// PUT /api/v1/profile
async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let mut form = read_upload_form(multipart, "avatar").await?;
    let form = ProfileForm {
        bio: form.take_text("bio"),
        avatar: form.image.take(),
    };

    let profile = ProfileService::update(state.db(), state.uploads(), &auth_user, form).await?;
    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated".to_string(),
        profile,
    }))
}
