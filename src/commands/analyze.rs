use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};

use super::{parse_json_body, required_text};
use crate::error::AppResult;
use crate::models::AnalyzeResponse;
use crate::state::AppState;

/// `POST /api/analyze`: feedback for a piece of journal text, nothing is stored.
pub async fn analyze_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<AnalyzeResponse>> {
    let payload = parse_json_body(&headers, &body)?;
    let content = required_text(&payload, "content")?;

    log::info!("Analyzing entry ({} chars)", content.chars().count());
    let outcome = state.analyzer.analyze(&content).await?;

    Ok(Json(outcome.into()))
}
