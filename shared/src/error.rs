use thiserror::Error;

/// Request faults that are not turned into a response.
///
/// These propagate out of the handler as `lambda_http::Error` and surface as a
/// failed invocation.
#[derive(Debug, Error)]
pub enum TaskFault {
    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("request has no `{0}` claim")]
    MissingClaim(&'static str),

    #[error("request has no `id` path parameter")]
    MissingTaskId,
}
