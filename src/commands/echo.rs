use axum::{body::Bytes, http::HeaderMap, Json};
use serde_json::{json, Value};

use super::{parse_json_body, string_field};
use crate::error::{AppError, AppResult};

/// `POST /api/log`: echoes the submitted text upper-cased.
pub async fn log_text(headers: HeaderMap, body: Bytes) -> AppResult<Json<Value>> {
    let payload = parse_json_body(&headers, &body)?;

    let text = string_field(&payload, "text")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Text field is required and must be a string".to_string()))?;
    log::debug!("Processing text: {}", text);

    Ok(Json(json!({
        "success": true,
        "result": text.to_uppercase(),
    })))
}
