// Re-export model types, the store port and service functions
pub mod dynamo;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use dynamo::DynamoTaskStore;
pub use memory::InMemoryTaskStore;
pub use model::{CreateTaskPayload, Task, UpdateTaskPayload, VolunteerPayload, OPEN_STATUS};
pub use service::*;
pub use store::{Condition, ConditionalUpdate, StoreError, StoreResult, TaskAttribute, TaskStore};
