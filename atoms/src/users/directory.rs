//! Identity-provider port: look users up by their subject claim.

use async_trait::async_trait;
use thiserror::Error;

use super::model::UserProfile;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no user with sub {subject} in pool {pool_id}")]
    NotFound { pool_id: String, subject: String },

    #[error("user directory error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Profile of the user whose `sub` is `subject` in user pool `pool_id`.
    async fn find_by_subject(&self, pool_id: &str, subject: &str) -> DirectoryResult<UserProfile>;
}
