//! Per-request session check and redirect policy.
//!
//! Every request goes through [`session_gate`]: the path is classified, the
//! session is resolved with the auth backend (refreshing it when needed), and
//! the request is either passed on or redirected. Cookies issued by a refresh
//! are attached to whatever response leaves the gate.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::UpstreamError;
use crate::models::{AuthSettings, Session};
use crate::services::auth_client::AuthClient;
use crate::state::AppState;
use crate::utils::cookies::{cleared_session_cookies, read_session_tokens, session_cookies, SessionTokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires an active session.
    Protected,
    /// Only meaningful without a session (login, signup).
    AuthOnly,
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    PassThrough,
    RedirectToLogin,
    RedirectToHome,
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify_route(path: &str, settings: &AuthSettings) -> RouteClass {
    if settings
        .protected_routes
        .iter()
        .any(|route| matches_prefix(path, route))
    {
        RouteClass::Protected
    } else if settings.auth_routes.iter().any(|route| route == path) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Unrestricted
    }
}

pub fn decide(class: RouteClass, has_session: bool) -> GateDecision {
    match (has_session, class) {
        (false, RouteClass::Protected) => GateDecision::RedirectToLogin,
        (true, RouteClass::AuthOnly) => GateDecision::RedirectToHome,
        _ => GateDecision::PassThrough,
    }
}

/// Login path with the originally requested path in `redirectTo`.
pub fn login_location(settings: &AuthSettings, requested_path: &str) -> String {
    match reqwest::Url::parse(&format!("http://gate.invalid{}", settings.login_path)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("redirectTo", requested_path);
            format!("{}?{}", url.path(), url.query().unwrap_or_default())
        }
        Err(e) => {
            log::warn!("Login path {} is not a valid path: {}", settings.login_path, e);
            settings.login_path.clone()
        }
    }
}

/// Session for the request plus any cookies the auth backend issued while resolving it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession {
    pub session: Option<Session>,
    pub set_cookies: Vec<HeaderValue>,
}

pub async fn resolve_session(
    auth: &AuthClient,
    tokens: &SessionTokens,
) -> Result<ResolvedSession, UpstreamError> {
    if tokens.is_empty() {
        return Ok(ResolvedSession::default());
    }

    if let Some(access_token) = &tokens.access_token {
        if let Some(user) = auth.get_user(access_token).await? {
            return Ok(ResolvedSession {
                session: Some(Session {
                    user,
                    access_token: access_token.clone(),
                    refresh_token: tokens.refresh_token.clone(),
                }),
                set_cookies: vec![],
            });
        }
    }

    let refreshed = match &tokens.refresh_token {
        Some(refresh_token) => auth.refresh_session(refresh_token).await?,
        None => None,
    };

    Ok(match refreshed {
        Some(session) => {
            log::debug!("Refreshed session for user {}", session.user.id);
            ResolvedSession {
                set_cookies: session_cookies(&session, auth.settings()),
                session: Some(session),
            }
        }
        None => ResolvedSession {
            session: None,
            set_cookies: cleared_session_cookies(auth.settings()),
        },
    })
}

/// Puts `cookies` ahead of the `Set-Cookie` headers already on the response, so a
/// handler that sets or clears the same cookie has the final say.
fn prepend_set_cookies(headers: &mut HeaderMap, cookies: &[HeaderValue]) {
    if cookies.is_empty() {
        return;
    }
    let existing: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).iter().cloned().collect();
    headers.remove(header::SET_COOKIE);
    for cookie in cookies.iter().chain(existing.iter()) {
        headers.append(header::SET_COOKIE, cookie.clone());
    }
}

fn redirect_with_cookies(location: &str, cookies: &[HeaderValue]) -> Response {
    let mut response = Redirect::temporary(location).into_response();
    prepend_set_cookies(response.headers_mut(), cookies);
    response
}

pub async fn session_gate(State(state): State<Arc<AppState>>, mut req: Request, next: Next) -> Response {
    let settings = &state.settings.auth;
    let path = req.uri().path().to_string();
    let class = classify_route(&path, settings);
    let tokens = read_session_tokens(req.headers(), settings);

    let resolved = match resolve_session(&state.auth, &tokens).await {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("Session lookup failed for {}: {}", path, e);
            if class == RouteClass::AuthOnly {
                return next.run(req).await;
            }
            return redirect_with_cookies(&login_location(settings, &path), &[]);
        }
    };

    let decision = decide(class, resolved.session.is_some());
    log::debug!("{} {:?} -> {:?}", path, class, decision);

    match decision {
        GateDecision::RedirectToLogin => {
            redirect_with_cookies(&login_location(settings, &path), &resolved.set_cookies)
        }
        GateDecision::RedirectToHome => redirect_with_cookies(&settings.home_path, &resolved.set_cookies),
        GateDecision::PassThrough => {
            if let Some(session) = resolved.session {
                req.extensions_mut().insert(session);
            }
            let mut response = next.run(req).await;
            prepend_set_cookies(response.headers_mut(), &resolved.set_cookies);
            response
        }
    }
}
