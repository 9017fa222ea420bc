use lambda_http::{Body, Error, Request, Response};
use marketplace_shared::request::{TaskRequest, TaskResponse};
use marketplace_shared::{tasks, AppState};
use std::sync::Arc;

const VOLUNTEER_RESOURCE: &str = "/task/{id}/volunteer";

/// Main Lambda handler - normalizes the event and routes it to a task operation
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let request = TaskRequest::from_lambda(&event);
    tracing::info!(
        "🚀 Tasks Lambda invoked - Method: {} Resource: {}",
        request.http_method,
        request.resource
    );

    let response = route(&state, &request).await.inspect_err(|e| {
        tracing::error!("❌ {} {} failed: {}", request.http_method, request.resource, e);
    })?;

    response.into_response()
}

pub(crate) async fn route(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    let has_id = request.has_path_parameters();

    match (request.http_method.as_str(), has_id) {
        ("GET", false) => tasks::list_tasks(state).await,
        ("GET", true) => tasks::get_task(state, request).await,
        ("POST", _) => tasks::create_task(state, request).await,
        ("PUT", _) if request.resource == VOLUNTEER_RESOURCE => {
            tasks::volunteer_for_task(state, request).await
        }
        ("PUT", true) => tasks::update_task(state, request).await,
        ("DELETE", true) => tasks::delete_task(state, request).await,
        (method, _) => {
            tracing::warn!("⚠️ No route for {} {}, echoing request", method, request.resource);
            tasks::echo_request(request)
        }
    }
}
