use sea_orm::DbErr;
use thiserror::Error;

pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid symbol {0:?}")]
    InvalidSymbol(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        SyncError::NotFound { entity, id }
    }

    /// Errors caused by the caller's input rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidSymbol(_) | SyncError::InvalidInput(_) | SyncError::NotFound { .. }
        )
    }
}
