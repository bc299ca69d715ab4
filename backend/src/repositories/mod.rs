//! Database repositories
//!
//! Provides data access layer for database operations. Every repository
//! reports failures as [`StoreError`] so callers can tell a missing row
//! from a constraint violation from anything else.

pub mod book;
pub mod profile;
pub mod user;

pub use book::{BookChanges, BookRecord, BookRepository, NewBook};
pub use profile::{ProfileRecord, ProfileRepository};
pub use user::{UserRecord, UserRepository};

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Outcome of a failed store operation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {constraint:?}")]
    UniqueViolation { constraint: Option<String> },

    #[error("foreign key constraint violated: {constraint:?}")]
    ForeignKeyViolation { constraint: Option<String> },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }

        let classified = err.as_database_error().map(|db| {
            let constraint = db.constraint().map(str::to_string);
            match db.kind() {
                ErrorKind::UniqueViolation => Some(StoreError::UniqueViolation { constraint }),
                ErrorKind::ForeignKeyViolation => {
                    Some(StoreError::ForeignKeyViolation { constraint })
                }
                _ => None,
            }
        });

        match classified {
            Some(Some(store_err)) => store_err,
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
