//! Book service
//!
//! Mutations follow one order: load the book, run the ownership guard,
//! store any new image, then write the row. Image files that end up
//! unreferenced are removed best-effort.

use crate::auth::{authorize, AuthUser};
use crate::error::ApiError;
use crate::repositories::{BookChanges, BookRecord, BookRepository, NewBook};
use crate::uploads::{remove_quietly, ImageUpload, UploadStore, BOOK_IMAGES};
use bookshelf_shared::types::{BookResponse, UserSummary};
use bookshelf_shared::validation::{clamp_page_size, validate_book_field};
use sqlx::PgPool;
use tracing::info;

/// Fields of a book form. Text fields are as received; empty means absent.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub name: Option<String>,
    pub author: Option<String>,
    pub image: Option<ImageUpload>,
}

impl From<BookRecord> for BookResponse {
    fn from(record: BookRecord) -> Self {
        BookResponse {
            id: record.id,
            name: record.name,
            author: record.author,
            image: record.image,
            creator: UserSummary {
                id: record.user_id,
                username: record.creator_username,
            },
        }
    }
}

/// Trimmed value, or `None` when missing or blank
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct BookService;

impl BookService {
    pub async fn list(pool: &PgPool) -> Result<Vec<BookResponse>, ApiError> {
        let books = BookRepository::list_all(pool).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// First `count` books; `count` is clamped to the maximum page size
    pub async fn page(pool: &PgPool, count: u32) -> Result<Vec<BookResponse>, ApiError> {
        let limit = clamp_page_size(count);
        let books = BookRepository::list_page(pool, i64::from(limit)).await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<BookResponse, ApiError> {
        Self::load(pool, id).await.map(BookResponse::from)
    }

    pub async fn create(
        pool: &PgPool,
        uploads: &dyn UploadStore,
        caller: &AuthUser,
        form: BookForm,
    ) -> Result<BookResponse, ApiError> {
        let name = present(form.name).unwrap_or_default();
        let author = present(form.author).unwrap_or_default();
        validate_book_field("name", &name).map_err(ApiError::Validation)?;
        validate_book_field("author", &author).map_err(ApiError::Validation)?;
        let image = form
            .image
            .ok_or_else(|| ApiError::Validation("image is required".to_string()))?;

        let image_path = uploads
            .save(BOOK_IMAGES, &image.extension, image.body)
            .await
            .map_err(ApiError::Internal)?;

        let new_book = NewBook {
            name,
            author,
            image: image_path.clone(),
            user_id: caller.user_id,
        };

        match BookRepository::create(pool, new_book).await {
            Ok(record) => {
                info!(book_id = record.id, user_id = caller.user_id, "Book created");
                Ok(record.into())
            }
            Err(e) => {
                remove_quietly(uploads, &image_path).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(
        pool: &PgPool,
        uploads: &dyn UploadStore,
        caller: &AuthUser,
        id: i64,
        form: BookForm,
    ) -> Result<BookResponse, ApiError> {
        let name = present(form.name);
        let author = present(form.author);
        if let Some(name) = &name {
            validate_book_field("name", name).map_err(ApiError::Validation)?;
        }
        if let Some(author) = &author {
            validate_book_field("author", author).map_err(ApiError::Validation)?;
        }

        let existing = Self::load(pool, id).await?;
        authorize(existing.user_id, caller)?;

        let new_image = match form.image {
            Some(image) => Some(
                uploads
                    .save(BOOK_IMAGES, &image.extension, image.body)
                    .await
                    .map_err(ApiError::Internal)?,
            ),
            None => None,
        };

        let changes = BookChanges {
            name,
            author,
            image: new_image.clone(),
        };

        match BookRepository::update(pool, id, changes).await {
            Ok(record) => {
                if new_image.is_some() {
                    remove_quietly(uploads, &existing.image).await;
                }
                info!(book_id = id, user_id = caller.user_id, "Book updated");
                Ok(record.into())
            }
            Err(e) => {
                if let Some(path) = &new_image {
                    remove_quietly(uploads, path).await;
                }
                Err(e.into())
            }
        }
    }

    pub async fn delete(
        pool: &PgPool,
        uploads: &dyn UploadStore,
        caller: &AuthUser,
        id: i64,
    ) -> Result<(), ApiError> {
        let existing = Self::load(pool, id).await?;
        authorize(existing.user_id, caller)?;

        if !BookRepository::delete(pool, id).await? {
            return Err(ApiError::NotFound("Book not found".to_string()));
        }
        remove_quietly(uploads, &existing.image).await;

        info!(book_id = id, user_id = caller.user_id, "Book deleted");
        Ok(())
    }

    async fn load(pool: &PgPool, id: i64) -> Result<BookRecord, ApiError> {
        BookRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))
    }
}
