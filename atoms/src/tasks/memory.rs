//! In-memory task store for handler tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::model::Task;
use super::store::{Condition, ConditionalUpdate, StoreError, StoreResult, TaskStore};

/// Thread-safe in-memory task store.
///
/// Conditional writes check and apply under one write lock, so concurrent
/// writers observe the same all-or-nothing behavior as the real table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    items: Arc<RwLock<BTreeMap<String, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let items = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }
}

fn poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("in-memory store lock poisoned: {}", err))
}

fn check(condition: Option<&Condition>, current: Option<&Task>) -> StoreResult<()> {
    match (condition, current) {
        (None, _) => Ok(()),
        (Some(condition), Some(task)) if condition.holds(task) => Ok(()),
        (Some(condition), _) => Err(StoreError::ConditionFailed(condition.to_string())),
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(id).cloned())
    }

    async fn scan(&self) -> StoreResult<Vec<Task>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.values().cloned().collect())
    }

    async fn put(&self, task: &Task) -> StoreResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn update(&self, id: &str, update: &ConditionalUpdate) -> StoreResult<Task> {
        let mut items = self.items.write().map_err(poisoned)?;
        check(update.condition(), items.get(id))?;

        // Unconditional update of a missing key would upsert a partial item in the table;
        // a Task cannot exist without its creation fields, so refuse instead.
        let task = items
            .get_mut(id)
            .ok_or_else(|| StoreError::Backend(format!("no task with id {}", id)))?;
        update.apply(task);
        Ok(task.clone())
    }

    async fn delete(&self, id: &str, condition: Option<&Condition>) -> StoreResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        check(condition, items.get(id))?;
        items.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::store::TaskAttribute;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryTaskStore {
        InMemoryTaskStore::with_tasks([Task {
            id: "t-1".to_string(),
            title: "Mow lawn".to_string(),
            description: "Front and back".to_string(),
            status: "Open".to_string(),
            created_at: "2024-05-01T09:30:00.000000Z".to_string(),
            updated_at: "2024-05-01T09:30:00.000000Z".to_string(),
            user_id: "owner-sub".to_string(),
            volunteer_id: None,
        }])
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_update_leaves_item_untouched(store: InMemoryTaskStore) {
        let update = ConditionalUpdate::new()
            .set(TaskAttribute::Description, "hijacked")
            .require_equals(TaskAttribute::UserId, "intruder-sub");

        let err = store.update("t-1", &update).await.unwrap_err();
        assert!(err.is_condition_failed());

        let stored = store.get("t-1").await.unwrap().unwrap();
        assert_eq!(stored.description, "Front and back");
    }

    #[rstest]
    #[tokio::test]
    async fn conditional_update_on_missing_item_fails_the_condition(store: InMemoryTaskStore) {
        let update = ConditionalUpdate::new()
            .set(TaskAttribute::Status, "Done")
            .require_equals(TaskAttribute::UserId, "owner-sub");

        let err = store.update("missing", &update).await.unwrap_err();
        assert!(err.is_condition_failed());
    }

    #[rstest]
    #[tokio::test]
    async fn conditional_delete_requires_matching_owner(store: InMemoryTaskStore) {
        let wrong = Condition::equals(TaskAttribute::UserId, "intruder-sub");
        assert!(store.delete("t-1", Some(&wrong)).await.unwrap_err().is_condition_failed());
        assert!(store.get("t-1").await.unwrap().is_some());

        let right = Condition::equals(TaskAttribute::UserId, "owner-sub");
        store.delete("t-1", Some(&right)).await.unwrap();
        assert!(store.get("t-1").await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn clones_share_the_same_items(store: InMemoryTaskStore) {
        let handle = store.clone();
        handle.delete("t-1", None).await.unwrap();
        assert!(store.scan().await.unwrap().is_empty());
    }
}
