use serde::{Deserialize, Serialize};

use crate::tasks::Task;

/// One name/value pair from the identity provider's user record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProfileAttribute {
    pub name: String,
    pub value: String,
}

/// User record as returned by the identity provider's user search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub attributes: Vec<ProfileAttribute>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(ProfileAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// First value stored under `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Owner summary attached to a single-task read.
///
/// Emails are only filled in for the task's owner or volunteer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TaskUser {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_email: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TaskWithUser {
    #[serde(flatten)]
    pub task: Task,
    pub user: TaskUser,
}
