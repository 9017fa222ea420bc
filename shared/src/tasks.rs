//! HTTP-shaped task operations. Each takes the injected state and a request
//! descriptor and answers with a response descriptor or a fault.

use lambda_http::{http::StatusCode, Error};
use marketplace_atoms::{tasks as task_service, users as user_service};

use crate::auth;
use crate::config::GatedRoute;
use crate::error::TaskFault;
use crate::payload;
use crate::request::{TaskRequest, TaskResponse};
use crate::AppState;

pub const UNAUTHORIZED_BODY: &str = "unauthorized user";
pub const MISSING_FIELDS_BODY: &str = "`title` and `description` are required";
pub const INVALID_STATUS_BODY: &str = "Invalid status";

pub fn unauthorized() -> TaskResponse {
    TaskResponse::text(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY)
}

/// Fallback for method/path combinations nothing else handles
pub fn echo_request(request: &TaskRequest) -> Result<TaskResponse, Error> {
    Ok(TaskResponse::json(StatusCode::OK, request)?)
}

fn required_subject(request: &TaskRequest) -> Result<&str, TaskFault> {
    auth::subject(request).ok_or(TaskFault::MissingClaim("sub"))
}

fn required_task_id(request: &TaskRequest) -> Result<&str, TaskFault> {
    request.path_id().ok_or(TaskFault::MissingTaskId)
}

/// GET /task
pub async fn list_tasks(state: &AppState) -> Result<TaskResponse, Error> {
    let tasks = task_service::list_tasks(state.task_store.as_ref()).await?;
    tracing::info!("📋 Listing {} tasks", tasks.len());
    Ok(TaskResponse::json(StatusCode::OK, &tasks)?)
}

/// GET /task/{id}, joined with the owner's profile
pub async fn get_task(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    if !auth::gate(request, state.config.bypasses_auth(GatedRoute::GetTask)) {
        tracing::warn!("🔒 Unauthenticated get_task");
        return Ok(unauthorized());
    }

    let task_id = required_task_id(request)?;
    let task = task_service::get_task(state.task_store.as_ref(), task_id)
        .await?
        .ok_or_else(|| TaskFault::TaskNotFound(task_id.to_string()))?;

    let issuer = auth::issuer(request).ok_or(TaskFault::MissingClaim("iss"))?;
    let requester_id = required_subject(request)?;
    let pool_id = auth::user_pool_id(issuer);

    let task_with_user = user_service::load_task_with_user(
        state.user_directory.as_ref(),
        pool_id,
        task,
        requester_id,
    )
    .await?;

    Ok(TaskResponse::json(StatusCode::OK, &task_with_user)?)
}

/// POST /task
pub async fn create_task(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    let Some(owner_id) = auth::subject(request) else {
        tracing::warn!("🔒 Unauthenticated create_task");
        return Ok(unauthorized());
    };

    let draft = match payload::create_payload(request.body.as_deref()) {
        Ok(draft) => draft,
        Err(e) if e.is_missing_field() => {
            tracing::warn!("⚠️ Rejected create_task: {}", e);
            return Ok(TaskResponse::text(StatusCode::BAD_REQUEST, MISSING_FIELDS_BODY));
        }
        Err(e) => return Err(e.into()),
    };

    let task = task_service::create_task(state.task_store.as_ref(), owner_id, draft).await?;
    Ok(TaskResponse::json(StatusCode::CREATED, &task)?)
}

async fn claim_task(state: &AppState, request: &TaskRequest, volunteer_id: &str) -> Result<TaskResponse, Error> {
    let task_id = required_task_id(request)?;
    let claim = payload::volunteer_payload(request.body.as_deref())?;
    let task = task_service::volunteer_for_task(state.task_store.as_ref(), task_id, volunteer_id, claim).await?;
    Ok(TaskResponse::json(StatusCode::OK, &task)?)
}

/// PUT /task/{id}/volunteer
///
/// Every failure inside the claim, a lost race included, answers 401
/// `Invalid status`.
pub async fn volunteer_for_task(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    if !auth::gate(request, state.config.bypasses_auth(GatedRoute::Volunteer)) {
        tracing::warn!("🔒 Unauthenticated volunteer_for_task");
        return Ok(unauthorized());
    }

    let volunteer_id = required_subject(request)?;

    match claim_task(state, request, volunteer_id).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!("⚠️ Volunteer claim by {} rejected: {}", volunteer_id, e);
            Ok(TaskResponse::text(StatusCode::UNAUTHORIZED, INVALID_STATUS_BODY))
        }
    }
}

/// PUT /task/{id}, owner only
pub async fn update_task(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    let Some(requester_id) = auth::subject(request) else {
        tracing::warn!("🔒 Unauthenticated update_task");
        return Ok(unauthorized());
    };

    let task_id = required_task_id(request)?;
    let changes = payload::update_payload(request.body.as_deref())?;
    let task = task_service::update_task(state.task_store.as_ref(), task_id, requester_id, changes).await?;

    tracing::info!("✏️ Task {} updated by {}", task.id, requester_id);
    Ok(TaskResponse::json(StatusCode::OK, &task)?)
}

/// DELETE /task/{id}, owner only
pub async fn delete_task(state: &AppState, request: &TaskRequest) -> Result<TaskResponse, Error> {
    let Some(requester_id) = auth::subject(request) else {
        tracing::warn!("🔒 Unauthenticated delete_task");
        return Ok(unauthorized());
    };

    let task_id = required_task_id(request)?;
    task_service::delete_task(state.task_store.as_ref(), task_id, requester_id).await?;
    Ok(TaskResponse::empty(StatusCode::NO_CONTENT))
}
