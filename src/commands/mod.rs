pub mod analyze;
pub mod auth;
pub mod echo;
pub mod entry;
pub mod pages;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query},
    http::{header, HeaderMap},
    Extension,
};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::Session;

/// Decodes a JSON request body, rejecting other content types before anything else runs.
pub fn parse_json_body(headers: &HeaderMap, body: &Bytes) -> AppResult<Value> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !is_json {
        return Err(AppError::UnsupportedMediaType);
    }

    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {}", e)))
}

pub fn string_field<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

/// String field that must be non-empty after trimming; returned trimmed.
pub fn required_text(payload: &Value, field: &str) -> AppResult<String> {
    string_field(payload, field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::BadRequest(format!("{} field is required and must be a non-empty string", field))
        })
}

/// Query string parameters; a malformed query is reported like any other bad input.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub fn require_session(session: Option<Extension<Session>>) -> AppResult<Session> {
    session.map(|Extension(s)| s).ok_or(AppError::Unauthorized)
}
