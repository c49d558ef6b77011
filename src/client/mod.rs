// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST client core: request methods, envelope handling, error
//! normalization, session storage and the token refresh gate.

pub mod api;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod interceptor;
pub mod session;

pub use api::{ApiClient, ApiRequest, MetaHook, RequestOptions, DEFAULT_TIMEOUT};
pub use envelope::{unwrap_payload, ResponseBody};
pub use error::{normalize, status_message, ApiError, ErrorCode, RequestFailure};
pub use gate::RefreshGate;
pub use interceptor::{AuthorizedClient, PathPattern};
pub use session::{FileStore, MemoryStore, Session, SessionError, SessionStore};
