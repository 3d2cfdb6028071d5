use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::UpstreamError;
use crate::models::{AuthSettings, Session, TokenGrant, User};

const SERVICE: &str = "auth API";

/// Thin client over the hosted auth backend's REST surface.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    settings: AuthSettings,
}

impl AuthClient {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.settings.url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), UpstreamError> {
        let response = request
            .header("apikey", &self.settings.anon_key)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { service: SERVICE, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| UpstreamError::Request { service: SERVICE, source })?;
        Ok((status, body))
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, UpstreamError> {
        serde_json::from_str(body).map_err(|source| UpstreamError::Decode { service: SERVICE, source })
    }

    /// `None` when the backend rejects the access token.
    pub async fn get_user(&self, access_token: &str) -> Result<Option<User>, UpstreamError> {
        let request = self.client.get(self.endpoint("user")).bearer_auth(access_token);
        let (status, body) = self.send(request).await?;

        match status {
            s if s.is_success() => Ok(Some(Self::decode(&body)?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(UpstreamError::Status { service: SERVICE, status, body }),
        }
    }

    /// `None` when the refresh token is no longer valid.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Option<Session>, UpstreamError> {
        let request = self
            .client
            .post(self.endpoint("token?grant_type=refresh_token"))
            .json(&json!({ "refresh_token": refresh_token }));
        let (status, body) = self.send(request).await?;

        match status {
            s if s.is_success() => Ok(Some(Self::decode::<TokenGrant>(&body)?.into())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Ok(None),
            status => Err(UpstreamError::Status { service: SERVICE, status, body }),
        }
    }

    /// `None` when the credentials are rejected.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Session>, UpstreamError> {
        let request = self
            .client
            .post(self.endpoint("token?grant_type=password"))
            .json(&json!({ "email": email, "password": password }));
        let (status, body) = self.send(request).await?;

        match status {
            s if s.is_success() => Ok(Some(Self::decode::<TokenGrant>(&body)?.into())),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Ok(None),
            status => Err(UpstreamError::Status { service: SERVICE, status, body }),
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<(), UpstreamError> {
        let request = self.client.post(self.endpoint("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }));
        let (status, body) = self.send(request).await?;

        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status { service: SERVICE, status, body })
        }
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), UpstreamError> {
        let request = self.client.post(self.endpoint("logout")).bearer_auth(access_token);
        let (status, body) = self.send(request).await?;

        // An already expired token has nothing left to revoke.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(UpstreamError::Status { service: SERVICE, status, body })
        }
    }
}

/// Human readable reason from an auth backend error body, if it carries one.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
