//! Book repository
//!
//! Every read joins the owning user so handlers can render the creator
//! without a second round trip.

use super::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Book row joined with its creator's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRecord {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub image: String,
    pub user_id: i64,
    pub creator_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub image: String,
    pub user_id: i64,
}

/// Input for updating a book. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub name: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
}

const SELECT_WITH_CREATOR: &str = r#"
    SELECT b.id, b.name, b.author, b.image, b.user_id,
           u.username AS creator_username, b.created_at, b.updated_at
    FROM books b
    JOIN users u ON u.id = b.user_id
"#;

pub struct BookRepository;

impl BookRepository {
    /// All books, oldest first
    pub async fn list_all(pool: &PgPool) -> StoreResult<Vec<BookRecord>> {
        let sql = format!("{SELECT_WITH_CREATOR} ORDER BY b.id");
        let books = sqlx::query_as::<_, BookRecord>(&sql).fetch_all(pool).await?;
        Ok(books)
    }

    /// The first `limit` books, oldest first
    pub async fn list_page(pool: &PgPool, limit: i64) -> StoreResult<Vec<BookRecord>> {
        let sql = format!("{SELECT_WITH_CREATOR} ORDER BY b.id LIMIT $1");
        let books = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    /// Books owned by one user
    pub async fn list_by_owner(pool: &PgPool, user_id: i64) -> StoreResult<Vec<BookRecord>> {
        let sql = format!("{SELECT_WITH_CREATOR} WHERE b.user_id = $1 ORDER BY b.id");
        let books = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> StoreResult<Option<BookRecord>> {
        let sql = format!("{SELECT_WITH_CREATOR} WHERE b.id = $1");
        let book = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(book)
    }

    /// Insert a book. A duplicate name surfaces as a unique violation on
    /// `books_name_key`; an unknown owner as a foreign key violation.
    pub async fn create(pool: &PgPool, book: NewBook) -> StoreResult<BookRecord> {
        let record = sqlx::query_as::<_, BookRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO books (name, author, image, user_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, author, image, user_id, created_at, updated_at
            )
            SELECT i.id, i.name, i.author, i.image, i.user_id,
                   u.username AS creator_username, i.created_at, i.updated_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(book.name)
        .bind(book.author)
        .bind(book.image)
        .bind(book.user_id)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Update a book in place; `RowNotFound` if it vanished meanwhile
    pub async fn update(pool: &PgPool, id: i64, changes: BookChanges) -> StoreResult<BookRecord> {
        let record = sqlx::query_as::<_, BookRecord>(
            r#"
            WITH updated AS (
                UPDATE books SET
                    name = COALESCE($2, name),
                    author = COALESCE($3, author),
                    image = COALESCE($4, image),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, author, image, user_id, created_at, updated_at
            )
            SELECT d.id, d.name, d.author, d.image, d.user_id,
                   u.username AS creator_username, d.created_at, d.updated_at
            FROM updated d
            JOIN users u ON u.id = d.user_id
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.author)
        .bind(changes.image)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Delete a book, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
