use axum::http::{header, HeaderMap, HeaderValue};

use crate::models::{AuthSettings, Session};

/// Tokens carried by the session cookies of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

pub fn access_cookie_name(settings: &AuthSettings) -> String {
    format!("{}-access-token", settings.cookie_name)
}

pub fn refresh_cookie_name(settings: &AuthSettings) -> String {
    format!("{}-refresh-token", settings.cookie_name)
}

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn read_session_tokens(headers: &HeaderMap, settings: &AuthSettings) -> SessionTokens {
    SessionTokens {
        access_token: read_cookie(headers, &access_cookie_name(settings)),
        refresh_token: read_cookie(headers, &refresh_cookie_name(settings)),
    }
}

fn format_set_cookie(name: &str, value: &str, max_age: i64, settings: &AuthSettings) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, value, max_age
    );
    if settings.secure_cookies {
        cookie.push_str("; Secure");
    }
    match HeaderValue::from_str(&cookie) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Dropping unencodable cookie {}: {}", name, e);
            None
        }
    }
}

pub fn session_cookies(session: &Session, settings: &AuthSettings) -> Vec<HeaderValue> {
    let max_age = settings.cookie_max_age_secs;
    let mut cookies = Vec::with_capacity(2);
    cookies.extend(format_set_cookie(
        &access_cookie_name(settings),
        &session.access_token,
        max_age,
        settings,
    ));
    if let Some(refresh_token) = &session.refresh_token {
        cookies.extend(format_set_cookie(
            &refresh_cookie_name(settings),
            refresh_token,
            max_age,
            settings,
        ));
    }
    cookies
}

pub fn cleared_session_cookies(settings: &AuthSettings) -> Vec<HeaderValue> {
    [access_cookie_name(settings), refresh_cookie_name(settings)]
        .iter()
        .filter_map(|name| format_set_cookie(name, "", 0, settings))
        .collect()
}

/// Appends every cookie to the headers; existing `Set-Cookie` values are kept.
pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[HeaderValue]) {
    for cookie in cookies {
        headers.append(header::SET_COOKIE, cookie.clone());
    }
}
