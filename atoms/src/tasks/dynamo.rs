use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::Task;
use super::store::{Condition, ConditionalUpdate, StoreError, StoreResult, TaskAttribute, TaskStore};

/// `TaskStore` backed by a DynamoDB table with partition key `id`.
#[derive(Debug, Clone)]
pub struct DynamoTaskStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoTaskStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

fn required_attr(item: &HashMap<String, AttributeValue>, name: &str) -> StoreResult<String> {
    string_attr(item, name).ok_or_else(|| StoreError::Malformed(format!("missing `{}`", name)))
}

pub(crate) fn task_from_item(item: &HashMap<String, AttributeValue>) -> StoreResult<Task> {
    Ok(Task {
        id: required_attr(item, "id")?,
        title: string_attr(item, "title").unwrap_or_default(),
        description: string_attr(item, "description").unwrap_or_default(),
        status: string_attr(item, "status").unwrap_or_default(),
        created_at: string_attr(item, "created_at").unwrap_or_default(),
        updated_at: string_attr(item, "updated_at").unwrap_or_default(),
        user_id: required_attr(item, "user_id")?,
        volunteer_id: string_attr(item, "volunteer_id"),
    })
}

pub(crate) fn task_to_item(task: &Task) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("id".to_string(), AttributeValue::S(task.id.clone())),
        ("title".to_string(), AttributeValue::S(task.title.clone())),
        ("description".to_string(), AttributeValue::S(task.description.clone())),
        ("status".to_string(), AttributeValue::S(task.status.clone())),
        ("created_at".to_string(), AttributeValue::S(task.created_at.clone())),
        ("updated_at".to_string(), AttributeValue::S(task.updated_at.clone())),
        ("user_id".to_string(), AttributeValue::S(task.user_id.clone())),
    ]);
    if let Some(volunteer_id) = &task.volunteer_id {
        item.insert("volunteer_id".to_string(), AttributeValue::S(volunteer_id.clone()));
    }
    item
}

/// Placeholder maps shared by update and condition expressions.
///
/// Every attribute goes through a `#name` placeholder since `status` is a reserved word.
#[derive(Debug, Default)]
pub(crate) struct Expression {
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl Expression {
    fn name_placeholder(&mut self, attribute: TaskAttribute) -> String {
        let placeholder = format!("#{}", attribute.name());
        self.names.insert(placeholder.clone(), attribute.name().to_string());
        placeholder
    }

    fn assignment(&mut self, attribute: TaskAttribute, value: &str) -> String {
        let name = self.name_placeholder(attribute);
        let value_placeholder = format!(":{}", attribute.name());
        self.values
            .insert(value_placeholder.clone(), AttributeValue::S(value.to_string()));
        format!("{} = {}", name, value_placeholder)
    }

    // Condition values get their own prefix: the volunteer claim sets and checks `status`.
    fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Equals(attribute, expected) => {
                let name = self.name_placeholder(*attribute);
                let value_placeholder = format!(":expected_{}", attribute.name());
                self.values
                    .insert(value_placeholder.clone(), AttributeValue::S(expected.clone()));
                format!("{} = {}", name, value_placeholder)
            }
        }
    }

    fn names(&self) -> Option<HashMap<String, String>> {
        (!self.names.is_empty()).then(|| self.names.clone())
    }

    fn values(&self) -> Option<HashMap<String, AttributeValue>> {
        (!self.values.is_empty()).then(|| self.values.clone())
    }
}

/// Renders `SET ...` and the optional condition for an update.
pub(crate) fn update_expression(update: &ConditionalUpdate) -> (String, Option<String>, Expression) {
    let mut expression = Expression::default();
    let assignments: Vec<String> = update
        .assignments()
        .iter()
        .map(|(attribute, value)| expression.assignment(*attribute, value))
        .collect();
    let condition = update.condition().map(|c| expression.condition(c));
    (format!("SET {}", assignments.join(", ")), condition, expression)
}

#[async_trait]
impl TaskStore for DynamoTaskStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB get_item error: {}", DisplayErrorContext(&e))))?;

        result.item().map(task_from_item).transpose()
    }

    async fn scan(&self) -> StoreResult<Vec<Task>> {
        let mut pages = self
            .client
            .scan()
            .table_name(&self.table_name)
            .into_paginator()
            .items()
            .send();

        let mut tasks = Vec::new();
        while let Some(item) = pages.next().await {
            let item = item
                .map_err(|e| StoreError::Backend(format!("DynamoDB scan error: {}", DisplayErrorContext(&e))))?;
            tasks.push(task_from_item(&item)?);
        }
        Ok(tasks)
    }

    async fn put(&self, task: &Task) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(task)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB put_item error: {}", DisplayErrorContext(&e))))?;
        Ok(())
    }

    async fn update(&self, id: &str, update: &ConditionalUpdate) -> StoreResult<Task> {
        if update.assignments().is_empty() {
            return Err(StoreError::Backend("update has no assignments".to_string()));
        }
        let (update_expr, condition_expr, expression) = update_expression(update);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(update_expr)
            .set_condition_expression(condition_expr)
            .set_expression_attribute_names(expression.names())
            .set_expression_attribute_values(expression.values())
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_conditional_check_failed_exception() {
                    let condition = update.condition().map(|c| c.to_string()).unwrap_or_default();
                    StoreError::ConditionFailed(condition)
                } else {
                    StoreError::Backend(format!("DynamoDB update_item error: {}", DisplayErrorContext(&e)))
                }
            })?;

        let attributes = result
            .attributes()
            .ok_or_else(|| StoreError::Malformed("update_item returned no attributes".to_string()))?;
        task_from_item(attributes)
    }

    async fn delete(&self, id: &str, condition: Option<&Condition>) -> StoreResult<()> {
        let mut expression = Expression::default();
        let condition_expr = condition.map(|c| expression.condition(c));

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .set_condition_expression(condition_expr)
            .set_expression_attribute_names(expression.names())
            .set_expression_attribute_values(expression.values())
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_conditional_check_failed_exception() {
                    StoreError::ConditionFailed(condition.map(|c| c.to_string()).unwrap_or_default())
                } else {
                    StoreError::Backend(format!("DynamoDB delete_item error: {}", DisplayErrorContext(&e)))
                }
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "t-1".to_string(),
            title: "Walk dog".to_string(),
            description: "Twice a day".to_string(),
            status: "Open".to_string(),
            created_at: "2024-05-01T09:30:00.000000Z".to_string(),
            updated_at: "2024-05-02T10:00:00.000000Z".to_string(),
            user_id: "owner-sub".to_string(),
            volunteer_id: None,
        }
    }

    #[test]
    fn item_without_volunteer_omits_the_attribute() {
        let item = task_to_item(&sample());
        assert!(!item.contains_key("volunteer_id"));
        assert_eq!(task_from_item(&item).unwrap(), sample());
    }

    #[test]
    fn item_missing_owner_is_malformed() {
        let mut item = task_to_item(&sample());
        item.remove("user_id");
        assert!(matches!(task_from_item(&item), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn volunteer_claim_renders_distinct_value_placeholders() {
        let update = ConditionalUpdate::new()
            .set(TaskAttribute::VolunteerId, "helper-sub")
            .set(TaskAttribute::Status, "Claimed")
            .require_equals(TaskAttribute::Status, "Open");

        let (update_expr, condition_expr, expression) = update_expression(&update);

        assert_eq!(update_expr, "SET #volunteer_id = :volunteer_id, #status = :status");
        assert_eq!(condition_expr.as_deref(), Some("#status = :expected_status"));

        let values = expression.values().unwrap();
        assert_eq!(values.get(":status"), Some(&AttributeValue::S("Claimed".to_string())));
        assert_eq!(values.get(":expected_status"), Some(&AttributeValue::S("Open".to_string())));
        assert_eq!(expression.names().unwrap().get("#status").map(String::as_str), Some("status"));
    }

    #[test]
    fn unconditional_expression_has_no_placeholders() {
        let expression = Expression::default();
        assert!(expression.names().is_none());
        assert!(expression.values().is_none());
    }
}
