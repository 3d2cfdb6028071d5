//! Page routes. Rendering lives in the client; each page answers with the data it shows.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::{query_params, require_session};
use crate::database::queries;
use crate::error::AppResult;
use crate::models::{DashboardView, HistoryQuery, HistoryView, ProfileView, Session};
use crate::state::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_HISTORY_DAYS: u32 = 365;
const RECENT_ENTRIES: u32 = 10;

/// The write page works signed out too; submitting requires a session.
pub async fn write_page(session: Option<Extension<Session>>) -> Json<Value> {
    let user = session.map(|Extension(s)| ProfileView::from(&s.user));
    Json(json!({
        "page": "write",
        "signed_in": user.is_some(),
        "user": user,
    }))
}

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> AppResult<Json<DashboardView>> {
    let session = require_session(session)?;
    let user_id = session.user.id;
    let entries = state
        .db
        .run(move |conn| queries::list_entries(conn, &user_id, None))
        .await?;

    Ok(Json(DashboardView {
        count: entries.len(),
        entries,
    }))
}

pub async fn history_page(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<HistoryView>> {
    let session = require_session(session)?;
    let HistoryQuery { days } = query_params(query)?;
    let days = days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS);
    let since = chrono::Utc::now() - chrono::Duration::days(i64::from(days));

    let user_id = session.user.id;
    let tz = state.timezone;
    let view = state
        .db
        .run(move |conn| {
            Ok(HistoryView {
                trend: queries::score_trend(conn, &user_id, since, tz)?,
                recent: queries::list_entries(conn, &user_id, Some(RECENT_ENTRIES))?,
            })
        })
        .await?;

    Ok(Json(view))
}

pub async fn profile_page(session: Option<Extension<Session>>) -> AppResult<Json<ProfileView>> {
    let session = require_session(session)?;
    Ok(Json(ProfileView::from(&session.user)))
}

pub async fn settings_page(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> AppResult<Json<Value>> {
    let session = require_session(session)?;
    let user_id = session.user.id;
    let entry_count = state
        .db
        .run(move |conn| queries::count_entries(conn, &user_id))
        .await?;

    Ok(Json(json!({
        "page": "settings",
        "entry_count": entry_count,
        "timezone": state.timezone.name(),
        "analysis_enabled": state.analyzer.is_configured(),
    })))
}

pub async fn login_page() -> Json<Value> {
    Json(json!({ "page": "login" }))
}

pub async fn signup_page() -> Json<Value> {
    Json(json!({ "page": "signup" }))
}
