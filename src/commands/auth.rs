use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use super::{parse_json_body, required_text, string_field};
use crate::error::{AppError, AppResult, UpstreamError};
use crate::models::{ProfileView, Session};
use crate::services::auth_client::error_message;
use crate::state::AppState;
use crate::utils::cookies::{append_set_cookies, cleared_session_cookies, session_cookies};

/// Client-side rejections from the auth backend are shown to the user; anything else is ours.
fn signup_error(err: UpstreamError) -> AppError {
    match err {
        UpstreamError::Status { status, body, .. } if status.is_client_error() => AppError::BadRequest(
            error_message(&body).unwrap_or_else(|| "Sign up was rejected".to_string()),
        ),
        other => other.into(),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let payload = parse_json_body(&headers, &body)?;
    let email = required_text(&payload, "email")?;
    let password = string_field(&payload, "password")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("password field is required".to_string()))?;

    let session = state
        .auth
        .sign_in_with_password(&email, password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    log::info!("User {} signed in", session.user.id);

    let mut response = Json(json!({
        "success": true,
        "user": ProfileView::from(&session.user),
    }))
    .into_response();
    append_set_cookies(response.headers_mut(), &session_cookies(&session, &state.settings.auth));
    Ok(response)
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let payload = parse_json_body(&headers, &body)?;
    let email = required_text(&payload, "email")?;
    let password = string_field(&payload, "password")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("password field is required".to_string()))?;
    let name = string_field(&payload, "name").map(str::trim).filter(|n| !n.is_empty());

    state
        .auth
        .sign_up(&email, password, name)
        .await
        .map_err(signup_error)?;

    Ok(Json(json!({ "success": true, "redirect": state.settings.auth.login_path })))
}

/// Always clears the session cookies, even when revoking the token upstream fails.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<Session>>,
) -> Response {
    if let Some(Extension(session)) = session {
        if let Err(e) = state.auth.sign_out(&session.access_token).await {
            log::warn!("Sign out for user {} failed upstream: {}", session.user.id, e);
        }
    }

    let mut response = Json(json!({ "success": true })).into_response();
    append_set_cookies(response.headers_mut(), &cleared_session_cookies(&state.settings.auth));
    response
}
