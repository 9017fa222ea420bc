pub mod directory;
pub mod memory;
pub mod model;
pub mod service;

pub use directory::{DirectoryError, DirectoryResult, UserDirectory};
pub use memory::InMemoryUserDirectory;
pub use model::{ProfileAttribute, TaskUser, TaskWithUser, UserProfile};
pub use service::*;
