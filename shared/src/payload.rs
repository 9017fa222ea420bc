//! Request body parsing for task writes. Every text field is sanitized here.

use marketplace_atoms::tasks::{CreateTaskPayload, UpdateTaskPayload, VolunteerPayload};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::sanitize::strip_html;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body is missing")]
    MissingBody,

    #[error("request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request body is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a string or null")]
    InvalidField(&'static str),
}

impl PayloadError {
    pub fn is_missing_field(&self) -> bool {
        matches!(self, PayloadError::MissingField(_))
    }
}

fn parse_object(body: Option<&str>) -> Result<Map<String, Value>, PayloadError> {
    let body = body.ok_or(PayloadError::MissingBody)?;
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(PayloadError::NotAnObject),
    }
}

/// A key that must be present; `null` counts as present and sanitizes to "".
fn sanitized_field(map: &Map<String, Value>, key: &'static str) -> Result<String, PayloadError> {
    match map.get(key) {
        None => Err(PayloadError::MissingField(key)),
        Some(Value::Null) => Ok(strip_html(None)),
        Some(Value::String(text)) => Ok(strip_html(Some(text))),
        Some(_) => Err(PayloadError::InvalidField(key)),
    }
}

pub fn create_payload(body: Option<&str>) -> Result<CreateTaskPayload, PayloadError> {
    let map = parse_object(body)?;
    Ok(CreateTaskPayload {
        title: sanitized_field(&map, "title")?,
        description: sanitized_field(&map, "description")?,
        status: sanitized_field(&map, "status")?,
    })
}

pub fn update_payload(body: Option<&str>) -> Result<UpdateTaskPayload, PayloadError> {
    let map = parse_object(body)?;
    Ok(UpdateTaskPayload {
        description: sanitized_field(&map, "description")?,
        status: sanitized_field(&map, "status")?,
    })
}

pub fn volunteer_payload(body: Option<&str>) -> Result<VolunteerPayload, PayloadError> {
    let map = parse_object(body)?;
    Ok(VolunteerPayload {
        status: sanitized_field(&map, "status")?,
    })
}
