//! Claim extraction and the per-route authentication gate.
//!
//! Signature and expiry checks happen in the API Gateway authorizer before the
//! lambda runs; here we only look at what it forwarded.

use crate::request::{Claims, TaskRequest};

pub fn claims(request: &TaskRequest) -> Option<&Claims> {
    request.request_context.authorizer.as_ref()?.claims.as_ref()
}

pub fn subject(request: &TaskRequest) -> Option<&str> {
    claims(request)?.sub.as_deref()
}

pub fn issuer(request: &TaskRequest) -> Option<&str> {
    claims(request)?.iss.as_deref()
}

pub fn is_user_sub_present(request: &TaskRequest) -> bool {
    subject(request).is_some()
}

/// Whether a request may enter a protected route.
///
/// `bypass` reproduces the legacy routes that never evaluated the check.
pub fn gate(request: &TaskRequest, bypass: bool) -> bool {
    bypass || is_user_sub_present(request)
}

/// User pool id from an issuer URL (its last path segment)
pub fn user_pool_id(issuer: &str) -> &str {
    issuer.rsplit('/').next().unwrap_or(issuer)
}
