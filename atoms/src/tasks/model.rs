use serde::{Deserialize, Serialize};

/// Status a task must hold before anyone can volunteer for it
pub const OPEN_STATUS: &str = "Open";

/// Task domain model - a job posted to the marketplace
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String, // opaque, only "Open" is special

    pub created_at: String,
    pub updated_at: String,

    /// Subject claim of the principal who posted the task
    pub user_id: String,

    /// Subject claim of the principal who claimed the task, set once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volunteer_id: Option<String>,
}

// Payloads carry already-sanitized text; parsing lives with the HTTP layer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskPayload {
    pub title: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskPayload {
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerPayload {
    pub status: String,
}
