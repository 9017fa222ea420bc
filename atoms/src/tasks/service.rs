use chrono::{SecondsFormat, Utc};

use super::model::{CreateTaskPayload, Task, UpdateTaskPayload, VolunteerPayload, OPEN_STATUS};
use super::store::{Condition, ConditionalUpdate, StoreResult, TaskAttribute, TaskStore};

/// Current UTC time as ISO-8601 with microseconds and a `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Create a new task owned by `owner_id` (pure domain logic, no HTTP)
pub async fn create_task<S: TaskStore + ?Sized>(
    store: &S,
    owner_id: &str,
    payload: CreateTaskPayload,
) -> StoreResult<Task> {
    let now = timestamp_now();
    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        status: payload.status,
        created_at: now.clone(),
        updated_at: now,
        user_id: owner_id.to_string(),
        volunteer_id: None,
    };

    // First write of a fresh id, nothing to conflict with
    store.put(&task).await?;
    tracing::info!("Created task {} for {}", task.id, owner_id);
    Ok(task)
}

/// Every task in the table, unfiltered
pub async fn list_tasks<S: TaskStore + ?Sized>(store: &S) -> StoreResult<Vec<Task>> {
    store.scan().await
}

pub async fn get_task<S: TaskStore + ?Sized>(store: &S, task_id: &str) -> StoreResult<Option<Task>> {
    store.get(task_id).await
}

/// Claim an open task for `volunteer_id`.
///
/// Sets the volunteer and the new status only while the stored status is still
/// `Open`, so of two racing volunteers exactly one wins.
pub async fn volunteer_for_task<S: TaskStore + ?Sized>(
    store: &S,
    task_id: &str,
    volunteer_id: &str,
    payload: VolunteerPayload,
) -> StoreResult<Task> {
    let update = ConditionalUpdate::new()
        .set(TaskAttribute::VolunteerId, volunteer_id)
        .set(TaskAttribute::Status, payload.status)
        .require_equals(TaskAttribute::Status, OPEN_STATUS);

    let task = store.update(task_id, &update).await?;
    tracing::info!("Task {} claimed by {} -> {}", task.id, volunteer_id, task.status);
    Ok(task)
}

/// Owner edit of description and status; refreshes `updated_at`
pub async fn update_task<S: TaskStore + ?Sized>(
    store: &S,
    task_id: &str,
    requester_id: &str,
    payload: UpdateTaskPayload,
) -> StoreResult<Task> {
    let update = ConditionalUpdate::new()
        .set(TaskAttribute::Description, payload.description)
        .set(TaskAttribute::UpdatedAt, timestamp_now())
        .set(TaskAttribute::Status, payload.status)
        .require_equals(TaskAttribute::UserId, requester_id);

    store.update(task_id, &update).await
}

/// Hard delete, only for the owner
pub async fn delete_task<S: TaskStore + ?Sized>(
    store: &S,
    task_id: &str,
    requester_id: &str,
) -> StoreResult<()> {
    let owner = Condition::equals(TaskAttribute::UserId, requester_id);
    store.delete(task_id, Some(&owner)).await?;
    tracing::info!("Deleted task {}", task_id);
    Ok(())
}
