// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated requests with transparent token refresh.
//!
//! [`AuthorizedClient`] attaches the stored access token to every
//! non-public request. When the upstream answers 401 it obtains a new
//! token through the shared [`RefreshGate`] and replays the request once.

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::api::{decode, ApiClient, ApiRequest, RequestOptions};
use super::error::ApiError;
use super::gate::RefreshGate;
use super::session::Session;
use crate::models::{RefreshRequest, TokenPair};

/// Token refresh endpoint.
pub const REFRESH_ENDPOINT: &str = "users/refresh";

/// How a public endpoint is recognised from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Whole path, ignoring leading/trailing slashes and the query string.
    Exact(String),
    /// Substring anywhere in the path.
    Contains(String),
}

impl PathPattern {
    pub fn exact(path: &str) -> Self {
        PathPattern::Exact(path.trim_matches('/').to_string())
    }

    pub fn contains(fragment: &str) -> Self {
        PathPattern::Contains(fragment.to_string())
    }

    pub fn matches(&self, endpoint: &str) -> bool {
        let path = endpoint.split('?').next().unwrap_or_default();
        match self {
            PathPattern::Exact(expected) => path.trim_matches('/') == expected,
            PathPattern::Contains(fragment) => path.contains(fragment.as_str()),
        }
    }
}

/// Endpoints that never carry a token and never trigger a refresh.
pub fn default_public_patterns() -> Vec<PathPattern> {
    vec![
        PathPattern::exact("users/authenticate"),
        PathPattern::exact("users"),
        PathPattern::exact(REFRESH_ENDPOINT),
        PathPattern::exact("users/forgot-password"),
        PathPattern::contains("auth/login"),
        PathPattern::contains("auth/register"),
        PathPattern::contains("public/"),
    ]
}

/// [`ApiClient`] plus session-backed bearer auth and refresh-on-401.
#[derive(Clone)]
pub struct AuthorizedClient {
    api: ApiClient,
    session: Session,
    gate: Arc<RefreshGate>,
    public: Arc<Vec<PathPattern>>,
}

impl AuthorizedClient {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            gate: Arc::new(RefreshGate::new()),
            public: Arc::new(default_public_patterns()),
        }
    }

    pub fn with_public_patterns(mut self, patterns: Vec<PathPattern>) -> Self {
        self.public = Arc::new(patterns);
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn is_public(&self, endpoint: &str) -> bool {
        self.public.iter().any(|p| p.matches(endpoint))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::GET, endpoint).options(options))
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::POST, endpoint).json(body)?.options(options))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::PUT, endpoint).json(body)?.options(options))
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::PATCH, endpoint).json(body)?.options(options))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::new(Method::DELETE, endpoint).options(options))
            .await
    }

    /// Send a request, refreshing the access token once on 401.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let payload = self.send_value(&request).await?;
        decode(payload)
    }

    async fn send_value(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        if self.is_public(&request.endpoint) {
            return self.api.execute_value(request, None).await;
        }

        let sent_token = self.session.access_token();
        let err = match self.api.execute_value(request, sent_token.as_deref()).await {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        tracing::debug!(endpoint = %request.endpoint, "Got 401, obtaining a fresh token");

        let token = match self.token_after_unauthorized(sent_token.as_deref()).await {
            Ok(token) => token,
            Err(refresh_err) => {
                tracing::warn!(
                    endpoint = %request.endpoint,
                    error = %refresh_err,
                    "Could not refresh token, giving up on request"
                );
                return Err(err);
            }
        };

        self.api.execute_value(request, Some(&token)).await
    }

    /// Token to retry with after a 401 on a request sent with `sent`.
    async fn token_after_unauthorized(&self, sent: Option<&str>) -> Result<String, ApiError> {
        // Someone else already rotated the token since this request went out.
        if let Some(current) = self.session.access_token() {
            if Some(current.as_str()) != sent {
                return Ok(current);
            }
        }

        self.refresh().await
    }

    /// Refresh through the gate, sharing any refresh already in flight.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        self.gate.refresh(|| self.refresh_session()).await
    }

    /// Exchange the stored refresh token for new tokens.
    ///
    /// On failure the session is cleared: the user is signed out.
    async fn refresh_session(&self) -> Result<String, ApiError> {
        let result = self.exchange_refresh_token().await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Token refresh failed, clearing session");
            self.session.clear_all();
        }

        result
    }

    async fn exchange_refresh_token(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ApiError::named("NO_REFRESH_TOKEN", "No refresh token available"))?;

        let tokens: TokenPair = self
            .api
            .post(
                REFRESH_ENDPOINT,
                &RefreshRequest { refresh_token },
                RequestOptions::default(),
            )
            .await?;

        self.session
            .save_tokens(&tokens.access_token, &tokens.refresh_token)?;
        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_patterns() {
        let client = AuthorizedClient::new(ApiClient::new("http://localhost"), Session::in_memory());

        assert!(client.is_public("users/authenticate"));
        assert!(client.is_public("/users"));
        assert!(client.is_public("users?invite=1"));
        assert!(client.is_public("users/refresh"));
        assert!(client.is_public("v1/auth/login"));
        assert!(client.is_public("catalog/public/featured"));

        assert!(!client.is_public("users/42/tech-interests"));
        assert!(!client.is_public("users/me"));
        assert!(!client.is_public("course"));
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let client = AuthorizedClient::new(ApiClient::new("http://localhost"), Session::in_memory())
            .with_public_patterns(vec![PathPattern::exact("health")]);
        assert!(client.is_public("/health/"));
        assert!(!client.is_public("users/authenticate"));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_clears_session() {
        let session = Session::in_memory();
        session.save_access_token("stale").unwrap();
        let client = AuthorizedClient::new(ApiClient::new("http://127.0.0.1:9"), session.clone());

        let err = client.refresh().await.unwrap_err();
        assert_eq!(err.code.to_string(), "NO_REFRESH_TOKEN");
        assert!(session.access_token().is_none());
        assert!(!client.gate().is_refreshing());
    }
}
