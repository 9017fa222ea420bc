//! Fixed user directory for handler tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;

use super::directory::{DirectoryError, DirectoryResult, UserDirectory};
use super::model::UserProfile;

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<(String, String), UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        mut self,
        pool_id: impl Into<String>,
        subject: impl Into<String>,
        profile: UserProfile,
    ) -> Self {
        self.users.insert((pool_id.into(), subject.into()), profile);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_subject(&self, pool_id: &str, subject: &str) -> DirectoryResult<UserProfile> {
        self.users
            .get(&(pool_id.to_string(), subject.to_string()))
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                pool_id: pool_id.to_string(),
                subject: subject.to_string(),
            })
    }
}
