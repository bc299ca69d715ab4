//! Profile service - public profile view and profile updates

use crate::auth::{authorize, AuthUser};
use crate::error::ApiError;
use crate::repositories::{BookRepository, ProfileRecord, ProfileRepository, UserRepository};
use crate::uploads::{remove_quietly, ImageUpload, UploadStore, AVATARS};
use bookshelf_shared::types::{BookResponse, ProfileInfo, PublicProfileResponse};
use bookshelf_shared::validation::validate_bio;
use sqlx::PgPool;
use tracing::info;

/// Fields of a profile form. An absent field leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub bio: Option<String>,
    pub avatar: Option<ImageUpload>,
}

impl From<ProfileRecord> for ProfileInfo {
    fn from(record: ProfileRecord) -> Self {
        ProfileInfo {
            avatar: record.avatar,
            bio: record.bio,
        }
    }
}

/// Profile service for user profile operations
pub struct ProfileService;

impl ProfileService {
    /// A user with their profile (empty if never set) and their books
    pub async fn get_public(pool: &PgPool, user_id: i64) -> Result<PublicProfileResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

        let profile = ProfileRepository::find_by_user_id(pool, user_id)
            .await?
            .map(ProfileInfo::from)
            .unwrap_or_default();

        let books = BookRepository::list_by_owner(pool, user_id)
            .await?
            .into_iter()
            .map(BookResponse::from)
            .collect();

        Ok(PublicProfileResponse {
            id: user.id,
            username: user.username,
            profile,
            books,
        })
    }

    /// Update the caller's profile, creating it on first use
    pub async fn update(
        pool: &PgPool,
        uploads: &dyn UploadStore,
        caller: &AuthUser,
        form: ProfileForm,
    ) -> Result<ProfileInfo, ApiError> {
        if let Some(bio) = &form.bio {
            validate_bio(bio).map_err(ApiError::Validation)?;
        }

        let existing = ProfileRepository::find_by_user_id(pool, caller.user_id).await?;
        if let Some(profile) = &existing {
            authorize(profile.user_id, caller)?;
        }

        let new_avatar = match form.avatar {
            Some(image) => Some(
                uploads
                    .save(AVATARS, &image.extension, image.body)
                    .await
                    .map_err(ApiError::Internal)?,
            ),
            None => None,
        };

        let result = ProfileRepository::upsert(
            pool,
            caller.user_id,
            form.bio.as_deref(),
            new_avatar.as_deref(),
        )
        .await;

        match result {
            Ok(record) => {
                if let (Some(_), Some(old)) = (&new_avatar, &existing) {
                    remove_quietly(uploads, &old.avatar).await;
                }
                info!(
                    user_id = caller.user_id,
                    created = existing.is_none(),
                    "Profile saved"
                );
                Ok(record.into())
            }
            Err(e) => {
                if let Some(path) = &new_avatar {
                    remove_quietly(uploads, path).await;
                }
                Err(e.into())
            }
        }
    }
}
