pub mod auth;
pub mod cognito;
pub mod config;
pub mod error;
pub mod payload;
pub mod request;
pub mod sanitize;
pub mod tasks;

use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use marketplace_atoms::tasks::{DynamoTaskStore, TaskStore};
use marketplace_atoms::users::UserDirectory;
use std::sync::Arc;

use crate::cognito::CognitoUserDirectory;
use crate::config::Config;

/// Clients built once per cold start and shared by every invocation
#[derive(Clone)]
pub struct AppState {
    pub task_store: Arc<dyn TaskStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        task_store: Arc<dyn TaskStore>,
        user_directory: Arc<dyn UserDirectory>,
        config: Config,
    ) -> Self {
        Self {
            task_store,
            user_directory,
            config,
        }
    }

    /// DynamoDB and Cognito clients from the Lambda environment
    pub async fn from_env() -> Result<Self, lambda_http::Error> {
        let config = Config::from_env()?;
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let dynamo_client = DynamoClient::new(&aws_config);
        let cognito_client = CognitoClient::new(&aws_config);

        tracing::info!(
            "⚙️ Tasks table {}, auth bypass on {:?}",
            config.table_name,
            config.auth_bypass_routes
        );

        Ok(Self::new(
            Arc::new(DynamoTaskStore::new(dynamo_client, config.table_name.clone())),
            Arc::new(CognitoUserDirectory::new(cognito_client)),
            config,
        ))
    }
}
