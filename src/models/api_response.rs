// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The upstream API's uniform response envelope and its metadata shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to an envelope (pagination, timing, ...).
pub type Meta = Map<String, Value>;

/// `{ success, message, data, code?, meta? }` wrapper around every payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    /// Application error code, either a string or a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Envelope<T> {
    /// Successful envelope with no metadata.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            code: None,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Build metadata for `total` items split into pages of `limit`.
    pub fn for_page(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Recognise pagination metadata: `total`, `page` and `totalPages`
    /// must all be numeric.
    pub fn from_meta(meta: &Meta) -> Option<Self> {
        let total = meta.get("total")?.as_u64()?;
        let page = meta.get("page")?.as_u64()?;
        let total_pages = meta.get("totalPages")?.as_u64()?;
        let limit = meta.get("limit").and_then(Value::as_u64).unwrap_or(0);
        Some(Self {
            total,
            page,
            limit,
            total_pages,
        })
    }

    pub fn to_meta(self) -> Meta {
        let mut meta = Meta::new();
        meta.insert("total".to_string(), self.total.into());
        meta.insert("page".to_string(), self.page.into());
        meta.insert("limit".to_string(), self.limit.into());
        meta.insert("totalPages".to_string(), self.total_pages.into());
        meta
    }
}

/// Timing metadata some endpoints attach.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampMeta {
    pub timestamp: String,
    pub process_time: Option<f64>,
}

impl TimestampMeta {
    pub fn from_meta(meta: &Meta) -> Option<Self> {
        let timestamp = meta.get("timestamp")?.as_str()?.to_string();
        let process_time = meta.get("processTime").and_then(Value::as_f64);
        Some(Self {
            timestamp,
            process_time,
        })
    }
}
