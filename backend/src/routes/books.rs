//! Book routes
//!
//! Reads are public. Create, update and delete take an [`AuthUser`], so they
//! are rejected before the multipart body is read when the caller is not
//! authenticated.

use super::extract::ApiPath;
use super::forms::read_upload_form;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{BookForm, BookService};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_shared::types::{BookMutationResponse, BookResponse, MessageResponse};

/// Create book routes; `max_upload_bytes` bounds multipart bodies
pub fn book_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/pages/:count", get(page_books))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn book_form(multipart: Multipart) -> ApiResult<BookForm> {
    let mut form = read_upload_form(multipart, "image").await?;
    Ok(BookForm {
        name: form.take_text("name"),
        author: form.take_text("author"),
        image: form.image.take(),
    })
}

/// GET /api/v1/books
async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<BookResponse>>> {
    Ok(Json(BookService::list(state.db()).await?))
}

/// GET /api/v1/books/pages/:count
async fn page_books(
    State(state): State<AppState>,
    ApiPath(count): ApiPath<u32>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    Ok(Json(BookService::page(state.db(), count).await?))
}

/// GET /api/v1/books/:id
async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<BookResponse>> {
    Ok(Json(BookService::get(state.db(), id).await?))
}

/// POST /api/v1/books (multipart: name, author, image)
async fn create_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<BookMutationResponse>)> {
    let form = book_form(multipart).await?;
    let book = BookService::create(state.db(), state.uploads(), &auth_user, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookMutationResponse {
            message: "Book created".to_string(),
            book,
        }),
    ))
}

/// PUT /api/v1/books/:id (multipart, every field optional)
async fn update_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    multipart: Multipart,
) -> ApiResult<Json<BookMutationResponse>> {
    let form = book_form(multipart).await?;
    let book = BookService::update(state.db(), state.uploads(), &auth_user, id, form).await?;

    Ok(Json(BookMutationResponse {
        message: "Book updated".to_string(),
        book,
    }))
}

/// DELETE /api/v1/books/:id
async fn delete_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    BookService::delete(state.db(), state.uploads(), &auth_user, id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
