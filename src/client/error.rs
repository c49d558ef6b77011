// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized client errors.
//!
//! Every failed request, whatever went wrong, is reduced to one
//! [`ApiError`]: a human readable message plus a coarse [`ErrorCode`].

use serde_json::Value;
use std::fmt;

use super::envelope::ResponseBody;

/// Message for transport failures before any response arrived.
pub const CLIENT_ERROR_PREFIX: &str = "Connection error";

/// Coarse error classification, rendered as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Transport or connectivity failure (`CLIENT_ERROR`).
    Client,
    /// Input rejected before any request was sent (`VALIDATION_ERROR`).
    Validation,
    /// HTTP status, or a numeric code embedded by the server.
    Numeric(i64),
    /// Named code embedded by the server or raised locally.
    Named(String),
}

impl ErrorCode {
    /// Read an envelope-embedded `code` (string or number).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ErrorCode::Numeric),
            Value::String(s) if !s.is_empty() => Some(ErrorCode::Named(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Client => f.write_str("CLIENT_ERROR"),
            ErrorCode::Validation => f.write_str("VALIDATION_ERROR"),
            ErrorCode::Numeric(n) => write!(f, "{}", n),
            ErrorCode::Named(s) => f.write_str(s),
        }
    }
}

/// A failed API call, normalized.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: ErrorCode,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
            status: None,
        }
    }

    /// Network-level failure.
    pub fn client(detail: impl fmt::Display) -> Self {
        Self::new(
            format!("{}: {}", CLIENT_ERROR_PREFIX, detail),
            ErrorCode::Client,
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Validation)
    }

    pub fn named(code: &str, message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Named(code.to_string()))
    }

    /// Request exceeded its timeout; reported like an HTTP 408.
    pub fn timeout() -> Self {
        normalize(RequestFailure::Timeout)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return normalize(RequestFailure::Timeout);
        }
        if let Some(status) = err.status() {
            return normalize(RequestFailure::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default(),
                body: None,
            });
        }
        normalize(RequestFailure::Network(err.to_string()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");

        ApiError::validation(message)
    }
}

/// What went wrong with a request, before normalization.
#[derive(Debug, Clone)]
pub enum RequestFailure<'a> {
    /// No response: DNS, connect, TLS, broken pipe...
    Network(String),
    /// No response within the request timeout.
    Timeout,
    /// A non-success response.
    Http {
        status: u16,
        status_text: &'a str,
        body: Option<Value>,
    },
}

/// Fixed message for a known HTTP status, or the generic fallback.
pub fn status_message(status: u16, status_text: &str) -> String {
    match status {
        0 => "Unable to reach the server. Check your internet connection.".to_string(),
        400 => "Invalid request. Check the submitted data.".to_string(),
        401 => "Unauthorized access. Please sign in again.".to_string(),
        403 => "Access forbidden. You do not have the required permissions.".to_string(),
        404 => "Resource not found.".to_string(),
        408 => "Request timed out. Please try again.".to_string(),
        429 => "Too many requests. Please wait before trying again.".to_string(),
        500 => "Internal server error. Please try again later.".to_string(),
        502..=504 => "Service temporarily unavailable. Please try again later.".to_string(),
        _ => {
            let reason = status_text.trim();
            let reason = if reason.is_empty() { "Unknown" } else { reason };
            format!("Error {}: {}", status, reason)
        }
    }
}

/// Reduce a request failure to a single message and code.
pub fn normalize(failure: RequestFailure<'_>) -> ApiError {
    let error = match &failure {
        RequestFailure::Network(detail) => ApiError::client(detail),
        RequestFailure::Timeout => ApiError {
            message: status_message(408, "Request Timeout"),
            code: ErrorCode::Numeric(408),
            status: Some(408),
        },
        RequestFailure::Http {
            status,
            status_text,
            body,
        } => normalize_http(*status, status_text, body.as_ref()),
    };

    tracing::debug!(
        code = %error.code,
        status = ?error.status,
        message = %error.message,
        "API request failed"
    );

    error
}

fn normalize_http(status: u16, status_text: &str, body: Option<&Value>) -> ApiError {
    let status_code = ErrorCode::Numeric(i64::from(status));

    if let Some(body) = body {
        // Server already classified the failure.
        if let ResponseBody::Enveloped(envelope) = ResponseBody::classify(body.clone()) {
            return ApiError {
                message: envelope.message,
                code: envelope
                    .code
                    .as_ref()
                    .and_then(ErrorCode::from_value)
                    .unwrap_or(status_code),
                status: Some(status),
            };
        }

        if let Some(message) = body.get("message").and_then(Value::as_str) {
            return ApiError {
                message: message.to_string(),
                code: status_code,
                status: Some(status),
            };
        }
    }

    ApiError {
        message: status_message(status, status_text),
        code: status_code,
        status: Some(status),
    }
}
