use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{json, Value};

use super::{parse_json_body, query_params, require_session, required_text};
use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{ListEntriesQuery, NewEntry, Session};
use crate::state::AppState;

/// Analyzes the content, then stores it together with the parsed feedback.
/// Nothing is stored when the analysis fails.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let session = require_session(session)?;
    let payload = parse_json_body(&headers, &body)?;
    let content = required_text(&payload, "content")?;

    let outcome = state.analyzer.analyze(&content).await?;

    let new_entry = NewEntry::analyzed(&session.user.id, &content, &outcome.parsed, outcome.version);
    let entry = state
        .db
        .run(move |conn| queries::insert_entry(conn, &new_entry))
        .await?;
    log::info!("Saved entry {} for user {}", entry.id, session.user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "entry": entry,
            "analysis": outcome.analysis,
        })),
    ))
}

pub async fn get_entries(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    query: Result<Query<ListEntriesQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let ListEntriesQuery { limit } = query_params(query)?;
    let user_id = session.user.id;
    let entries = state
        .db
        .run(move |conn| queries::list_entries(conn, &user_id, limit))
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": entries.len(),
        "entries": entries,
    })))
}

pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let user_id = session.user.id;
    let entry_id = id.clone();
    let entry = state
        .db
        .run(move |conn| queries::get_entry(conn, &user_id, &entry_id))
        .await?
        .ok_or(AppError::EntryNotFound(id))?;

    Ok(Json(json!({ "success": true, "entry": entry })))
}

/// Content-only edit; the stored feedback stays as it was at creation.
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let payload = parse_json_body(&headers, &body)?;
    let content = required_text(&payload, "content")?;

    let user_id = session.user.id;
    let entry_id = id.clone();
    let entry = state
        .db
        .run(move |conn| queries::update_entry_content(conn, &user_id, &entry_id, &content))
        .await?
        .ok_or(AppError::EntryNotFound(id))?;

    Ok(Json(json!({ "success": true, "entry": entry })))
}

pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let user_id = session.user.id;
    let entry_id = id.clone();
    let deleted = state
        .db
        .run(move |conn| queries::delete_entry(conn, &user_id, &entry_id))
        .await?;
    if !deleted {
        return Err(AppError::EntryNotFound(id));
    }

    Ok(Json(json!({ "success": true })))
}

pub async fn export_entries(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let user_id = session.user.id;
    let entries = state
        .db
        .run(move |conn| queries::list_entries(conn, &user_id, None))
        .await?;

    Ok(Json(json!({
        "success": true,
        "version": state.settings.version,
        "exported_at": chrono::Utc::now().to_rfc3339(),
        "entries": entries,
    })))
}

pub async fn reset_entries(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let user_id = session.user.id.clone();
    let deleted = state
        .db
        .run(move |conn| queries::delete_entries_for_user(conn, &user_id))
        .await?;
    log::info!("Reset {} entries for user {}", deleted, session.user.id);

    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
