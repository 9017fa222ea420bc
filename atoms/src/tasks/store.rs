//! Store port for the `Tasks` table plus the typed conditional-write builder.
//!
//! Handlers describe *what* to write and under which precondition; adapters
//! own the query language. Every conditional write is all-or-nothing: when the
//! precondition does not hold at write time nothing changes and the adapter
//! returns [`StoreError::ConditionFailed`].

use async_trait::async_trait;
use thiserror::Error;

use super::model::Task;

pub type StoreResult<T> = Result<T, StoreError>;

/// Task attributes that can be written after creation or used in a condition.
///
/// `id`, `title` and `created_at` are deliberately absent: they are fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAttribute {
    Description,
    Status,
    UpdatedAt,
    UserId,
    VolunteerId,
}

impl TaskAttribute {
    /// Attribute name as stored in the table.
    pub fn name(self) -> &'static str {
        match self {
            TaskAttribute::Description => "description",
            TaskAttribute::Status => "status",
            TaskAttribute::UpdatedAt => "updated_at",
            TaskAttribute::UserId => "user_id",
            TaskAttribute::VolunteerId => "volunteer_id",
        }
    }

    pub fn read(self, task: &Task) -> Option<&str> {
        match self {
            TaskAttribute::Description => Some(&task.description),
            TaskAttribute::Status => Some(&task.status),
            TaskAttribute::UpdatedAt => Some(&task.updated_at),
            TaskAttribute::UserId => Some(&task.user_id),
            TaskAttribute::VolunteerId => task.volunteer_id.as_deref(),
        }
    }

    pub fn write(self, task: &mut Task, value: String) {
        match self {
            TaskAttribute::Description => task.description = value,
            TaskAttribute::Status => task.status = value,
            TaskAttribute::UpdatedAt => task.updated_at = value,
            TaskAttribute::UserId => task.user_id = value,
            TaskAttribute::VolunteerId => task.volunteer_id = Some(value),
        }
    }
}

/// Precondition checked atomically with a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(TaskAttribute, String),
}

impl Condition {
    pub fn equals(attribute: TaskAttribute, value: impl Into<String>) -> Self {
        Condition::Equals(attribute, value.into())
    }

    /// Whether the condition holds against the currently stored task.
    pub fn holds(&self, task: &Task) -> bool {
        match self {
            Condition::Equals(attribute, expected) => attribute.read(task) == Some(expected.as_str()),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Equals(attribute, expected) => {
                write!(f, "{} = {:?}", attribute.name(), expected)
            }
        }
    }
}

/// Attribute assignments applied together, optionally guarded by a [`Condition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalUpdate {
    assignments: Vec<(TaskAttribute, String)>,
    condition: Option<Condition>,
}

impl ConditionalUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, attribute: TaskAttribute, value: impl Into<String>) -> Self {
        self.assignments.push((attribute, value.into()));
        self
    }

    pub fn require_equals(mut self, attribute: TaskAttribute, value: impl Into<String>) -> Self {
        self.condition = Some(Condition::equals(attribute, value));
        self
    }

    pub fn assignments(&self) -> &[(TaskAttribute, String)] {
        &self.assignments
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Applies the assignments to an in-memory copy of a task.
    pub fn apply(&self, task: &mut Task) {
        for (attribute, value) in &self.assignments {
            attribute.write(task, value.clone());
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected because its precondition did not hold.
    #[error("conditional check failed: {0}")]
    ConditionFailed(String),

    /// An item in the table could not be read back as a task.
    #[error("malformed task item: {0}")]
    Malformed(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_condition_failed(&self) -> bool {
        matches!(self, StoreError::ConditionFailed(_))
    }
}

/// Persistence contract for the `Tasks` table, keyed by `id`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Every stored task, across all result pages.
    async fn scan(&self) -> StoreResult<Vec<Task>>;

    /// Unconditional insert or overwrite.
    async fn put(&self, task: &Task) -> StoreResult<()>;

    /// Applies `update` and returns the task as it is after the write.
    async fn update(&self, id: &str, update: &ConditionalUpdate) -> StoreResult<Task>;

    async fn delete(&self, id: &str, condition: Option<&Condition>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn task() -> Task {
        Task {
            id: "t-1".to_string(),
            title: "Fix sink".to_string(),
            description: "Leaky".to_string(),
            status: "Open".to_string(),
            created_at: "2024-05-01T09:30:00.000000Z".to_string(),
            updated_at: "2024-05-01T09:30:00.000000Z".to_string(),
            user_id: "owner-sub".to_string(),
            volunteer_id: None,
        }
    }

    #[rstest]
    #[case(Condition::equals(TaskAttribute::Status, "Open"), true)]
    #[case(Condition::equals(TaskAttribute::Status, "Claimed"), false)]
    #[case(Condition::equals(TaskAttribute::UserId, "owner-sub"), true)]
    #[case(Condition::equals(TaskAttribute::UserId, "someone-else"), false)]
    #[case(Condition::equals(TaskAttribute::VolunteerId, "anyone"), false)]
    fn condition_checks_stored_value(#[case] condition: Condition, #[case] expected: bool) {
        assert_eq!(condition.holds(&task()), expected);
    }

    #[test]
    fn update_applies_assignments_in_order() {
        let update = ConditionalUpdate::new()
            .set(TaskAttribute::VolunteerId, "helper-sub")
            .set(TaskAttribute::Status, "Claimed")
            .require_equals(TaskAttribute::Status, "Open");

        let mut claimed = task();
        update.apply(&mut claimed);

        assert_eq!(claimed.volunteer_id.as_deref(), Some("helper-sub"));
        assert_eq!(claimed.status, "Claimed");
        assert_eq!(claimed.title, "Fix sink");
        assert_eq!(
            update.condition(),
            Some(&Condition::Equals(TaskAttribute::Status, "Open".to_string()))
        );
    }

    #[test]
    fn condition_display_names_the_attribute() {
        let condition = Condition::equals(TaskAttribute::UserId, "owner-sub");
        assert_eq!(condition.to_string(), "user_id = \"owner-sub\"");
    }
}
