//! Persistence contract and its Postgres and in-memory implementations.

pub mod models;
pub mod repositories;
pub mod schema;

use thiserror::Error;

pub use models::user::UserRecord;
pub use repositories::user::{MemoryUserRepository, PgUserRepository, UserKey, UserRepository};
pub use repositories::wh::{MemoryWhRepository, PgWhRepository, WhRepository};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    AlreadyExists,
    #[error("storage failure: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists,
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
