// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generic REST client for the upstream course API.
//!
//! Handles:
//! - Default headers and per-request timeouts
//! - Query parameter construction
//! - Envelope unwrapping (with a hook for envelope metadata)
//! - Error normalization

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::envelope::ResponseBody;
use super::error::{normalize, ApiError, RequestFailure};
use crate::config::Config;
use crate::models::Meta;

/// Timeout applied when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback receiving envelope `meta` before it is discarded.
pub type MetaHook = Arc<dyn Fn(&Meta) + Send + Sync>;

/// Per-request knobs. Everything is optional.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    /// Replaces the default JSON headers when set.
    pub headers: Option<HeaderMap>,
    pub timeout: Option<Duration>,
    pub meta_hook: Option<MetaHook>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("meta_hook", &self.meta_hook.is_some())
            .finish()
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Append parameters built from a JSON object (see [`build_params`]).
    pub fn params_from(mut self, value: &Value) -> Self {
        self.params.extend(build_params(value));
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_meta<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Meta) + Send + Sync + 'static,
    {
        self.meta_hook = Some(Arc::new(hook));
        self
    }
}

/// A fully described request; cloneable so it can be replayed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Attach a serializable body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::named(
                "SERIALIZATION_ERROR",
                format!("Failed to encode request body: {}", e),
            )
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Low-level client: one base URL, one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone()).with_default_timeout(config.api_timeout)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn full_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::GET, endpoint).options(options);
        self.execute(&request, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::POST, endpoint)
            .json(body)?
            .options(options);
        self.execute(&request, None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::PUT, endpoint)
            .json(body)?
            .options(options);
        self.execute(&request, None).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::PATCH, endpoint)
            .json(body)?
            .options(options);
        self.execute(&request, None).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::DELETE, endpoint).options(options);
        self.execute(&request, None).await
    }

    /// Send a request and decode the unwrapped payload.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let payload = self.execute_value(request, bearer).await?;
        decode(payload)
    }

    /// Send a request and return the unwrapped JSON payload.
    pub async fn execute_value(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.full_url(&request.endpoint);
        let options = &request.options;

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(options.headers.clone().unwrap_or_else(default_headers))
            .timeout(options.timeout.unwrap_or(self.default_timeout));

        if !options.params.is_empty() {
            builder = builder.query(&options.params);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            endpoint = %request.endpoint,
            authenticated = bearer.is_some(),
            "API request"
        );

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        let body = parse_body(text);

        if !status.is_success() {
            return Err(normalize(RequestFailure::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default(),
                body,
            }));
        }

        let (payload, meta) = ResponseBody::classify(body.unwrap_or(Value::Null)).into_parts();
        if let (Some(meta), Some(hook)) = (meta, &options.meta_hook) {
            hook(&meta);
        }

        Ok(payload)
    }
}

/// `Content-Type` and `Accept` set to JSON.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Decode an unwrapped payload into `T`.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| {
        ApiError::named(
            "PARSE_ERROR",
            format!("Unexpected response format: {}", e),
        )
    })
}

/// Flatten a JSON object into query parameters.
///
/// Null values are skipped, arrays become repeated keys, strings are used
/// verbatim and everything else uses its JSON rendering.
pub fn build_params(value: &Value) -> Vec<(String, String)> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };

    let mut params = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|i| !i.is_null()) {
                    params.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => params.push((key.clone(), scalar_to_string(other))),
        }
    }
    params
}

/// Join path segments with `/`, dropping empty ones.
///
/// `join_path(&["users", "123", "courses"])` is `"users/123/courses"`.
pub fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_body(text: String) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
