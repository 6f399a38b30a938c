//! Persistence errors and the in-memory backend used by the test suite.
//!
//! The Postgres backend lives in [`crate::db`]; each resource module adds its
//! own queries on top of [`crate::db::PgStore`].

pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps unique violations to [`StoreError::Duplicate`], everything else to `Database`.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(err)
    }
}
